//! Raw API calls through the stored session.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bistro_http::ApiRequest;

use crate::cli::ClientArgs;
use crate::output::{self, JsonStyle};
use crate::session;

#[derive(Args, Debug)]
pub struct ApiCommand {
    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// Send a GET request
    Get(QueryArgs),

    /// Send a DELETE request
    Delete(QueryArgs),

    /// Send a POST request
    Post(BodyArgs),

    /// Send a PUT request
    Put(BodyArgs),

    /// Send a PATCH request
    Patch(BodyArgs),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Endpoint path, e.g. /api/orders
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct BodyArgs {
    /// Endpoint path, e.g. /api/categories
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,
}

pub async fn handle(cmd: ApiCommand, client: &ClientArgs) -> Result<()> {
    let request = match cmd.command {
        ApiSubcommand::Get(args) => with_query(ApiRequest::get(args.path), args.query),
        ApiSubcommand::Delete(args) => with_query(ApiRequest::delete(args.path), args.query),
        ApiSubcommand::Post(args) => with_body(ApiRequest::post(args.path), args.data)?,
        ApiSubcommand::Put(args) => with_body(ApiRequest::put(args.path), args.data)?,
        ApiSubcommand::Patch(args) => with_body(ApiRequest::patch(args.path), args.data)?,
    };

    let session = session::open(client)?;
    let response = session.send(request).await.context("Request failed")?;
    let body = response.json_value().context("Response is not JSON")?;

    if body.is_null() {
        output::empty_response(response.status());
        return Ok(());
    }

    let style = if cmd.compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Pretty
    };
    output::json(&body, style)
}

fn with_query(request: ApiRequest, query: Vec<(String, String)>) -> ApiRequest {
    query
        .into_iter()
        .fold(request, |request, (key, value)| request.query(key, value))
}

fn with_body(request: ApiRequest, data: Option<String>) -> Result<ApiRequest> {
    let Some(data) = data else {
        return Ok(request);
    };
    let body: serde_json::Value = serde_json::from_str(&data).context("--data is not valid JSON")?;
    Ok(request.json_value(body))
}

fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_split_on_first_equals() {
        assert_eq!(
            parse_pair("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_pair("novalue").is_err());
    }

    #[test]
    fn body_must_be_json() {
        assert!(with_body(ApiRequest::post("/api/x"), Some("{".into())).is_err());
        let request = with_body(ApiRequest::post("/api/x"), Some(r#"{"a":1}"#.into())).unwrap();
        assert_eq!(request.body().unwrap()["a"], 1);
    }
}
