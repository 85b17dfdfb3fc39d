//! Tool operations: `tools/list` and `tools/call`.

use std::collections::HashMap;

use mcplink_protocol::Result;
use mcplink_protocol::types::{
    CallToolRequest, CallToolResult, Cursor, ListToolsRequest, ListToolsResult, Tool,
};
use mcplink_transport_traits::Transport;
use tracing::debug;

use crate::client::core::Client;

impl<T: Transport + 'static> Client<T> {
    /// List the tools on the first page the server returns.
    ///
    /// Servers that paginate may have more; a `nextCursor` is not followed
    /// here. Use [`list_tools_result`](Self::list_tools_result) to page
    /// through everything.
    ///
    /// ```rust,no_run
    /// # use mcplink_client::Client;
    /// # use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
    /// # async fn example() -> mcplink_client::Result<()> {
    /// let client = Client::new(ChildProcessTransport::new(ChildProcessConfig::new("server")));
    /// client.connect().await?;
    ///
    /// for tool in client.list_tools().await? {
    ///     println!("{}: {}", tool.name, tool.description.as_deref().unwrap_or("No description"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.list_tools_result(None).await?.tools)
    }

    /// One page of `tools/list`, including `next_cursor`.
    ///
    /// Pass `None` for the first page and the previous `next_cursor` for
    /// each following one.
    pub async fn list_tools_result(&self, cursor: Option<Cursor>) -> Result<ListToolsResult> {
        self.ensure_ready()?;
        let params = cursor.map(|cursor| ListToolsRequest {
            cursor: Some(cursor),
        });
        self.inner.protocol.request("tools/list", params, None).await
    }

    /// Invoke a tool.
    ///
    /// A tool that ran but failed is reported in the result
    /// ([`CallToolResult::is_error`]); an unknown tool or a server-side
    /// exception comes back as [`Error::Protocol`](mcplink_protocol::Error::Protocol).
    ///
    /// ```rust,no_run
    /// # use mcplink_client::Client;
    /// # use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
    /// # use std::collections::HashMap;
    /// # async fn example() -> mcplink_client::Result<()> {
    /// # let client = Client::new(ChildProcessTransport::new(ChildProcessConfig::new("server")));
    /// let mut args = HashMap::new();
    /// args.insert("query".to_string(), serde_json::json!("rust"));
    ///
    /// let result = client.call_tool("search", Some(args)).await?;
    /// println!("{}", result.text());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<CallToolResult> {
        self.ensure_ready()?;
        let request = CallToolRequest {
            name: name.to_string(),
            arguments,
        };
        let result: CallToolResult = self
            .inner
            .protocol
            .request("tools/call", Some(request), None)
            .await?;

        if result.is_error() {
            debug!(tool = name, "Tool reported an error result");
        }
        Ok(result)
    }
}
