//! SolidVM step debugger.
//!
//! Thin pass-through to the node's `/vm-debug` surface. Requests carry no
//! query string; responses are returned as the node sends them.

use crate::endpoint::endpoints;
use crate::error::Result;
use crate::options::{set_auth_headers, Options, User};
use crate::rest::StratoClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Source location to break at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Source file name
    pub name: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column; whole line when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Breakpoint {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        //! Breakpoint on a whole line.
        Self {
            name: name.into(),
            line,
            column: None,
        }
    }

    #[must_use]
    pub const fn at_column(mut self, column: u32) -> Self {
        //! Narrow the breakpoint to a column.
        self.column = Some(column);
        self
    }
}

fn debug_path(action: &str) -> String {
    format!("{}/{action}", endpoints::DEBUG)
}

impl StratoClient {
    async fn debug_get(&self, user: &User, action: &str, options: &Options) -> Result<Value> {
        let options = set_auth_headers(user, options);
        let path = debug_path(action);
        debug!(%path, "debugger request");
        self.transport.get(options.node_url()?, &path, &options).await
    }

    async fn debug_post(
        &self,
        user: &User,
        action: &str,
        body: Option<Value>,
        options: &Options,
    ) -> Result<Value> {
        let options = set_auth_headers(user, options);
        let path = debug_path(action);
        debug!(%path, "debugger request");
        self.transport
            .post(options.node_url()?, &path, body, &options)
            .await
    }

    async fn debug_put(&self, user: &User, action: &str, body: Value, options: &Options) -> Result<Value> {
        let options = set_auth_headers(user, options);
        let path = debug_path(action);
        debug!(%path, "debugger request");
        self.transport
            .put(options.node_url()?, &path, Some(body), &options)
            .await
    }

    async fn debug_delete(
        &self,
        user: &User,
        action: &str,
        body: Option<Value>,
        options: &Options,
    ) -> Result<Value> {
        let options = set_auth_headers(user, options);
        let path = debug_path(action);
        debug!(%path, "debugger request");
        self.transport
            .delete(options.node_url()?, &path, body, &options)
            .await
    }

    pub async fn debug_status(&self, user: &User, options: &Options) -> Result<Value> {
        //! Whether the VM is running or paused, and where.
        self.debug_get(user, "status", options).await
    }

    pub async fn debug_pause(&self, user: &User, options: &Options) -> Result<Value> {
        //! Pause execution at the next instruction.
        self.debug_post(user, "pause", None, options).await
    }

    pub async fn debug_resume(&self, user: &User, options: &Options) -> Result<Value> {
        //! Continue until the next breakpoint.
        self.debug_post(user, "resume", None, options).await
    }

    pub async fn debug_breakpoints(&self, user: &User, options: &Options) -> Result<Vec<Breakpoint>> {
        //! Currently set breakpoints.
        let response = self.debug_get(user, "breakpoints", options).await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn debug_add_breakpoints(
        &self,
        user: &User,
        breakpoints: &[Breakpoint],
        options: &Options,
    ) -> Result<Value> {
        //! Set breakpoints.
        self.debug_put(user, "breakpoints", serde_json::to_value(breakpoints)?, options)
            .await
    }

    pub async fn debug_remove_breakpoints(
        &self,
        user: &User,
        breakpoints: &[Breakpoint],
        options: &Options,
    ) -> Result<Value> {
        //! Unset breakpoints.
        self.debug_delete(
            user,
            "breakpoints",
            Some(serde_json::to_value(breakpoints)?),
            options,
        )
        .await
    }

    pub async fn debug_clear_breakpoints(&self, user: &User, options: &Options) -> Result<Value> {
        //! Unset all breakpoints.
        self.debug_delete(user, "clear-breakpoints", None, options)
            .await
    }

    pub async fn debug_step_in(&self, user: &User, options: &Options) -> Result<Value> {
        //! Step into the next call.
        self.debug_post(user, "step-in", None, options).await
    }

    pub async fn debug_step_over(&self, user: &User, options: &Options) -> Result<Value> {
        //! Step over the next statement.
        self.debug_post(user, "step-over", None, options).await
    }

    pub async fn debug_step_out(&self, user: &User, options: &Options) -> Result<Value> {
        //! Run until the current function returns.
        self.debug_post(user, "step-out", None, options).await
    }

    pub async fn debug_stack_trace(&self, user: &User, options: &Options) -> Result<Value> {
        //! Call stack of the paused VM.
        self.debug_get(user, "stack-trace", options).await
    }

    pub async fn debug_variables(&self, user: &User, options: &Options) -> Result<Value> {
        //! Variables in scope of the paused frame.
        self.debug_get(user, "variables", options).await
    }

    pub async fn debug_watches(&self, user: &User, options: &Options) -> Result<Vec<String>> {
        //! Watched expressions.
        let response = self.debug_get(user, "watches", options).await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn debug_add_watches(
        &self,
        user: &User,
        expressions: &[String],
        options: &Options,
    ) -> Result<Value> {
        //! Watch expressions.
        self.debug_put(user, "watches", serde_json::to_value(expressions)?, options)
            .await
    }

    pub async fn debug_remove_watches(
        &self,
        user: &User,
        expressions: &[String],
        options: &Options,
    ) -> Result<Value> {
        //! Stop watching expressions.
        self.debug_delete(
            user,
            "watches",
            Some(serde_json::to_value(expressions)?),
            options,
        )
        .await
    }

    pub async fn debug_clear_watches(&self, user: &User, options: &Options) -> Result<Value> {
        //! Stop watching everything.
        self.debug_delete(user, "clear-watches", None, options).await
    }

    pub async fn debug_eval(
        &self,
        user: &User,
        expressions: &[String],
        options: &Options,
    ) -> Result<Value> {
        //! Evaluate expressions in the paused frame.
        self.debug_post(
            user,
            "eval",
            Some(serde_json::to_value(expressions)?),
            options,
        )
        .await
    }
}
