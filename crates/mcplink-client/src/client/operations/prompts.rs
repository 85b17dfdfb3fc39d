//! Prompt operations: `prompts/list` and `prompts/get`.

use std::collections::HashMap;

use mcplink_protocol::Result;
use mcplink_protocol::types::{
    Cursor, GetPromptRequest, GetPromptResult, ListPromptsRequest, ListPromptsResult, Prompt,
};
use mcplink_transport_traits::Transport;

use crate::client::core::Client;

impl<T: Transport + 'static> Client<T> {
    /// Prompts on the first page the server returns
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        Ok(self.list_prompts_result(None).await?.prompts)
    }

    /// One page of `prompts/list`, including `next_cursor`
    pub async fn list_prompts_result(&self, cursor: Option<Cursor>) -> Result<ListPromptsResult> {
        self.ensure_ready()?;
        let params = cursor.map(|cursor| ListPromptsRequest {
            cursor: Some(cursor),
        });
        self.inner.protocol.request("prompts/list", params, None).await
    }

    /// Render prompt `name` with string `arguments`
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult> {
        self.ensure_ready()?;
        let request = GetPromptRequest {
            name: name.to_string(),
            arguments,
        };
        self.inner
            .protocol
            .request("prompts/get", Some(request), None)
            .await
    }
}
