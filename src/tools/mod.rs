// ABOUTME: Tool registry and handler trait for operations behind the authentication gate
// ABOUTME: Tools are registered at startup and dispatched by name from tools/call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Tool Execution
//!
//! Tools are the business operations the protected endpoint exists to serve.
//! The endpoint itself treats them as opaque collaborators: a handler is
//! invoked only after the authentication dispatcher has allowed the request,
//! and receives the authenticated context along with its arguments.

/// Built-in diagnostic tool reporting the caller's authentication state
pub mod auth_status;

use crate::auth::AuthResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Tool metadata advertised by `tools/list`
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within the registry
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// JSON schema of the tool's arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// A single content block in a tool result
#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    /// Content type discriminator (always `text`)
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text payload
    pub text: String,
}

impl TextContent {
    /// Wrap a string as a text content block
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_owned(),
            text: text.into(),
        }
    }
}

/// Context handed to every tool invocation
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Outcome of the authentication dispatch that admitted this request
    pub auth: AuthResult,
}

/// Why a tool call failed
#[derive(Debug, Error)]
pub enum ToolError {
    /// No handler registered under the requested name
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// The handler ran but reported a failure
    #[error("tool execution failed: {0}")]
    ExecutionFailed(String),
}

/// A single executable tool
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Metadata advertised by `tools/list`
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with the given arguments
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ExecutionFailed`] when the operation cannot
    /// produce a result.
    async fn call(&self, arguments: Value, context: &ToolContext)
        -> Result<Vec<TextContent>, ToolError>;
}

/// Registry of tools available behind the gate
///
/// Built once at startup and immutable afterwards; shared across request
/// handlers through an `Arc`.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool handler under its descriptor name
    #[must_use]
    pub fn register(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.insert(handler.descriptor().name, handler);
        self
    }

    /// Descriptors of every registered tool, sorted by name for stable output
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<_> = self
            .handlers
            .values()
            .map(|handler| handler.descriptor())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no tools are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a call to the named tool
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for unregistered names, or the
    /// handler's own failure.
    pub async fn call(
        &self,
        name: &str,
        arguments: Value,
        context: &ToolContext,
    ) -> Result<Vec<TextContent>, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        handler.call(arguments, context).await
    }
}
