//! Liveness check.

use mcplink_protocol::Result;
use mcplink_transport_traits::Transport;
use serde_json::Value;

use crate::client::core::Client;

impl<T: Transport + 'static> Client<T> {
    /// Send `ping` and wait for the server's answer.
    ///
    /// Any successful result counts, whatever its shape.
    pub async fn ping(&self) -> Result<()> {
        self.ensure_ready()?;
        let _: Value = self.inner.protocol.request("ping", None::<()>, None).await?;
        Ok(())
    }
}
