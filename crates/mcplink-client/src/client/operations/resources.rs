//! Resource operations: `resources/list` and `resources/read`.

use mcplink_protocol::Result;
use mcplink_protocol::types::{
    Cursor, ListResourcesRequest, ListResourcesResult, ReadResourceRequest, ReadResourceResult,
    Resource,
};
use mcplink_transport_traits::Transport;

use crate::client::core::Client;

impl<T: Transport + 'static> Client<T> {
    /// Resources on the first page the server returns
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.list_resources_result(None).await?.resources)
    }

    /// One page of `resources/list`, including `next_cursor`
    pub async fn list_resources_result(
        &self,
        cursor: Option<Cursor>,
    ) -> Result<ListResourcesResult> {
        self.ensure_ready()?;
        let params = cursor.map(|cursor| ListResourcesRequest {
            cursor: Some(cursor),
        });
        self.inner
            .protocol
            .request("resources/list", params, None)
            .await
    }

    /// Read the contents behind `uri`.
    ///
    /// A server that does not know the URI typically answers with
    /// [`JsonRpcErrorCode::ResourceNotFound`](mcplink_protocol::JsonRpcErrorCode::ResourceNotFound).
    ///
    /// ```rust,no_run
    /// # use mcplink_client::Client;
    /// # use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
    /// # async fn example() -> mcplink_client::Result<()> {
    /// # let client = Client::new(ChildProcessTransport::new(ChildProcessConfig::new("server")));
    /// let result = client.read_resource("file:///etc/motd").await?;
    /// for content in &result.contents {
    ///     if let Some(text) = content.as_text() {
    ///         println!("{text}");
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        self.ensure_ready()?;
        let request = ReadResourceRequest {
            uri: uri.to_string(),
        };
        self.inner
            .protocol
            .request("resources/read", Some(request), None)
            .await
    }
}
