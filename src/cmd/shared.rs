/*!
shared.rs - pieces every command runs through.

Pipeline per command:
  validate (Args -> typed Options) -> ensure connected -> acquire token
  -> request(s) -> transform (project / passthrough) -> emit

  - CommandContext: session + token provider + request client + output mode,
    passed explicitly into every command run
  - project: fixed field allowlist for text output
  - collection_items / follow_next_links: OData collection helpers
  - confirm: y/N prompt for destructive commands
*/

use anyhow::Result;
use serde_json::{Map, Value};
use std::io::{self, Write};
use tracing::debug;

use crate::auth::{Service, Session, TokenProvider};
use crate::cmd::format::OutputMode;
use crate::error::CommandError;
use crate::request::{ApiRequest, RequestClient};

/* ---- Context ---- */

/// Everything a command needs from the outside world.
pub struct CommandContext<'a> {
    pub session: &'a Session,
    pub tokens: &'a dyn TokenProvider,
    pub client: &'a dyn RequestClient,
    pub output: OutputMode,
}

impl CommandContext<'_> {
    /// Connection check then token for `resource`. No network call happens
    /// before the connection check passes.
    pub async fn authenticate(
        &self,
        service: Service,
        resource: &str,
    ) -> Result<String, CommandError> {
        self.session.ensure_connected(service)?;
        let token = self.tokens.access_token(service, resource).await?;
        debug!(%service, resource, "retrieved access token");
        Ok(token)
    }

    /// `authenticate` for services whose token resource is the connection's
    /// own (Azure AD Graph, Microsoft Graph). Returns `(token, resource)`.
    pub async fn authenticate_service(
        &self,
        service: Service,
    ) -> Result<(String, String), CommandError> {
        let conn = self.session.ensure_connected(service)?;
        let resource = conn
            .resource
            .as_deref()
            .or(service.fixed_resource())
            .map(|r| r.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                CommandError::Authentication(format!("No resource recorded for {service}"))
            })?;
        let token = self.authenticate(service, &resource).await?;
        Ok((token, resource))
    }

    pub async fn send(&self, request: ApiRequest) -> Result<Value, CommandError> {
        Ok(self.client.send(request).await?)
    }

    pub fn is_json(&self) -> bool {
        self.output == OutputMode::Json
    }
}

/* ---- Response shaping ---- */

/// Keep only `fields`, in that order. Missing fields become null so every
/// row has the same columns.
pub fn project(records: &[Value], fields: &[&str]) -> Value {
    Value::Array(
        records
            .iter()
            .map(|record| {
                let mut row = Map::with_capacity(fields.len());
                for field in fields {
                    row.insert(
                        (*field).to_string(),
                        record.get(*field).cloned().unwrap_or(Value::Null),
                    );
                }
                Value::Object(row)
            })
            .collect(),
    )
}

/// `value` array of an OData collection response (empty when absent).
pub fn collection_items(response: &Value) -> Vec<Value> {
    response
        .get("value")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Collect a Microsoft Graph collection, following `@odata.nextLink`
/// sequentially until the last page.
pub async fn follow_next_links(
    ctx: &CommandContext<'_>,
    first_url: String,
    token: &str,
    accept: &str,
) -> Result<Vec<Value>, CommandError> {
    let mut items = Vec::new();
    let mut next = Some(first_url);
    while let Some(url) = next.take() {
        let page = ctx.send(ApiRequest::get(url).bearer(token, accept)).await?;
        items.extend(collection_items(&page));
        next = page
            .get("@odata.nextLink")
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    Ok(items)
}

/* ---- Interactive ---- */

/// Ask a yes/no question on stdin; anything but y/yes declines.
/// The prompt goes to stderr so stdout only ever carries command output.
pub fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
