// ABOUTME: Built-in diagnostic tool reporting the caller's authentication state
// ABOUTME: Lets MCP clients confirm which method admitted them and when it expires
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::{TextContent, ToolContext, ToolDescriptor, ToolError, ToolHandler};
use crate::auth::AuthMethod;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Reports how the current request was authenticated
pub struct AuthStatusTool;

#[async_trait]
impl ToolHandler for AuthStatusTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_auth_status".to_owned(),
            description: "Report which authentication method admitted this request, \
                          the client it is bound to, and when the credential expires"
                .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }

    async fn call(
        &self,
        _arguments: Value,
        context: &ToolContext,
    ) -> Result<Vec<TextContent>, ToolError> {
        let auth = &context.auth;
        let client_id = match &auth.method {
            AuthMethod::OAuth2 { client_id } => Some(client_id.as_str()),
            AuthMethod::StaticBearer => None,
        };

        let status = json!({
            "authenticated": true,
            "method": auth.method.as_str(),
            "client_id": client_id,
            "scope": auth.scope,
            "expires_at": auth.expires_at.map(|t| t.to_rfc3339()),
        });

        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(vec![TextContent::new(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthResult;
    use chrono::Utc;

    #[tokio::test]
    async fn test_reports_oauth2_client() {
        let context = ToolContext {
            auth: AuthResult {
                method: AuthMethod::OAuth2 {
                    client_id: "c1".to_owned(),
                },
                scope: Some("mcp".to_owned()),
                expires_at: Some(Utc::now()),
            },
        };

        let result = AuthStatusTool.call(json!({}), &context).await.unwrap();
        assert!(result[0].text.contains("\"oauth2\""));
        assert!(result[0].text.contains("\"c1\""));
    }

    #[tokio::test]
    async fn test_reports_bearer_without_expiry() {
        let context = ToolContext {
            auth: AuthResult {
                method: AuthMethod::StaticBearer,
                scope: None,
                expires_at: None,
            },
        };

        let result = AuthStatusTool.call(json!({}), &context).await.unwrap();
        assert!(result[0].text.contains("\"bearer\""));
        assert!(result[0].text.contains("\"expires_at\": null"));
    }
}
