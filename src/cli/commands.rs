//! CLI command implementations
//!
//! Read commands are retried on transient failures; commands that change
//! state run once.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::ClientConfig;
use crate::errors::{ApiResult, ErrorHandler};
use crate::model::{RuleDraft, RuleQuery, TestRuleRequest};
use crate::observability::NoOpNotifier;
use crate::retry::with_retry;
use crate::service::validation::field_errors_to_error;
use crate::service::{validate_rule, RuleService};
use crate::transport::{HttpTransport, Interceptor, MemoryCredentialStore};

use super::args::{Cli, Command, GlobalOptions, RuleArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments, run the command and print its JSON result
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let outcome = run_command(cli);
    match &outcome {
        Ok(data) => write_response(data.clone())?,
        Err(err) => write_error(err)?,
    }
    outcome.map(|_| ())
}

/// Run one command and return its result payload
pub fn run_command(cli: Cli) -> CliResult<Value> {
    let config = load_config(&cli.options)?;

    if let Command::Check { rule } = &cli.command {
        return check(rule);
    }

    // Single-threaded cooperative scheduling
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute(cli.command, config, cli.options.token))
}

/// Build the configuration: file or environment presets, then flags
pub fn load_config(options: &GlobalOptions) -> CliResult<ClientConfig> {
    let mut config = match &options.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(url) = &options.base_url {
        config.base_url = url.clone();
    }
    if let Some(retries) = options.retries {
        config.max_retries = retries;
    }
    config.validate()?;
    Ok(config)
}

async fn execute(command: Command, config: ClientConfig, token: Option<String>) -> CliResult<Value> {
    let logger = config.logger();
    let handler = ErrorHandler::new(logger.clone(), Arc::new(NoOpNotifier)).notify_user(false);
    let policy = config.retry_policy();

    let transport = HttpTransport::builder(config.base_url.as_str())
        .timeout(config.timeout())
        .build()?;
    let credentials = match token {
        Some(token) => MemoryCredentialStore::with_token(token),
        None => MemoryCredentialStore::new(),
    };
    let interceptor = Interceptor::new(transport)
        .with_credentials(Arc::new(credentials))
        .with_logger(logger);
    let default_size = config.pagination.default_page_size;
    let service = RuleService::new(interceptor).with_config(config);

    match command {
        Command::List { enabled, keyword } => render(
            &handler,
            with_retry(|| service.list_rules(enabled, keyword.as_deref()), &policy).await,
        ),
        Command::Page {
            page,
            size,
            sort,
            order,
            name,
            enabled,
            from,
            to,
        } => {
            let query = RuleQuery {
                page,
                size: size.unwrap_or(default_size),
                sort,
                order: order.map(Into::into),
                rule_name: name,
                enabled,
                create_time_start: from,
                create_time_end: to,
            };
            render(
                &handler,
                with_retry(|| service.list_rules_paged(&query), &policy).await,
            )
        }
        Command::Search { keyword } => render(
            &handler,
            with_retry(|| service.search_rules(&keyword), &policy).await,
        ),
        Command::Get { id } => render(&handler, with_retry(|| service.get_rule(id), &policy).await),
        Command::Create { rule } => {
            let draft = read_draft(&rule)?;
            render(&handler, service.create_rule(&draft).await)
        }
        Command::Update { id, rule, version } => {
            let mut draft = read_draft(&rule)?;
            draft.version = version;
            render(&handler, service.update_rule(id, &draft).await)
        }
        Command::Delete { id } => {
            render(&handler, service.delete_rule(id).await)?;
            Ok(json!({ "deleted": [id] }))
        }
        Command::DeleteMany { ids } => {
            render(&handler, service.delete_rules(&ids).await)?;
            Ok(json!({ "deleted": ids }))
        }
        Command::Enable { id } => render(&handler, service.toggle_rule_status(id, true).await),
        Command::Disable { id } => render(&handler, service.toggle_rule_status(id, false).await),
        Command::Validate { file } => {
            let content = read_text(&file)?;
            render(
                &handler,
                with_retry(|| service.validate_rule(&content), &policy).await,
            )
        }
        Command::Test {
            ids,
            content_file,
            data,
            verbose,
        } => {
            let request = test_request(ids, content_file.as_deref(), data.as_deref(), verbose)?;
            render(&handler, service.test_rule(&request).await)
        }
        Command::Stats => render(&handler, with_retry(|| service.rule_statistics(), &policy).await),
        Command::Export { ids, output } => {
            let selection = (!ids.is_empty()).then_some(ids.as_slice());
            let bytes = with_retry(|| service.export_rules(selection), &policy)
                .await
                .map_err(|err| CliError::Api(handler.handle(err)))?;
            export_payload(bytes, output.as_deref())
        }
        Command::Import { file } => {
            let bytes = fs::read(&file)?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CliError::input(format!("not a file: {}", file.display())))?
                .to_string();
            render(&handler, service.import_rules(&file_name, bytes).await)
        }
        Command::Check { rule } => check(&rule),
    }
}

/// Serialize a successful result, or report the failure
fn render<T: Serialize>(handler: &ErrorHandler, result: ApiResult<T>) -> CliResult<Value> {
    match result {
        Ok(value) => Ok(serde_json::to_value(&value)?),
        Err(err) => Err(CliError::Api(handler.handle(err))),
    }
}

/// Local advisory checks
fn check(rule: &RuleArgs) -> CliResult<Value> {
    let draft = read_draft(rule)?;
    match validate_rule(&draft) {
        Ok(()) => Ok(json!({ "valid": true, "errors": [] })),
        Err(errors) => Err(CliError::Api(field_errors_to_error(
            "rule validation failed",
            &errors,
        ))),
    }
}

fn read_draft(rule: &RuleArgs) -> CliResult<RuleDraft> {
    let content = read_text(&rule.content_file)?;
    let mut draft = RuleDraft::new(rule.name.as_str(), content).with_enabled(!rule.disabled);
    if let Some(description) = &rule.description {
        draft = draft.with_description(description.as_str());
    }
    Ok(draft)
}

fn read_text(path: &Path) -> CliResult<String> {
    Ok(fs::read_to_string(path)?)
}

fn test_request(
    ids: Vec<u64>,
    content_file: Option<&Path>,
    data: Option<&Path>,
    verbose: bool,
) -> CliResult<TestRuleRequest> {
    let mut request = TestRuleRequest::default();
    if !ids.is_empty() {
        request.rule_ids = Some(ids);
    }
    if let Some(path) = content_file {
        request.rule_content = Some(read_text(path)?);
    }
    if let Some(path) = data {
        let facts: Map<String, Value> = match serde_json::from_str(&read_text(path)?)? {
            Value::Object(map) => map,
            _ => return Err(CliError::input("test data must be a JSON object")),
        };
        request.test_data = Some(facts);
    }
    if verbose {
        request = request.verbose();
    }
    Ok(request)
}

fn export_payload(bytes: Vec<u8>, output: Option<&Path>) -> CliResult<Value> {
    match output {
        Some(path) => {
            fs::write(path, &bytes)?;
            Ok(json!({ "path": path.display().to_string(), "bytes": bytes.len() }))
        }
        None => Ok(json!({
            "bytes": bytes.len(),
            "content": String::from_utf8_lossy(&bytes),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rule_args(name: &str, content: &str) -> (RuleArgs, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let args = RuleArgs {
            name: name.to_string(),
            content_file: file.path().to_path_buf(),
            description: None,
            disabled: false,
        };
        (args, file)
    }

    #[test]
    fn test_check_valid_rule() {
        let (args, _file) = rule_args("discount", "rule \"d\" when then end");
        assert_eq!(check(&args).unwrap()["valid"], true);
    }

    #[test]
    fn test_check_invalid_rule() {
        let (args, _file) = rule_args("bad/name", "when then");
        let err = check(&args).unwrap_err();
        match err {
            CliError::Api(api) => assert_eq!(api.field_errors().len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_load_config_flags_override() {
        let options = GlobalOptions {
            base_url: Some("http://rules.test/api".to_string()),
            retries: Some(1),
            ..Default::default()
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.base_url, "http://rules.test/api");
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_test_request_from_files() {
        let mut data = tempfile::NamedTempFile::new().unwrap();
        write!(data, r#"{{"amount": 120}}"#).unwrap();

        let request = test_request(vec![3], None, Some(data.path()), true).unwrap();
        assert_eq!(request.rule_ids, Some(vec![3]));
        assert_eq!(request.test_data.unwrap()["amount"], 120);
        assert_eq!(request.verbose, Some(true));

        let mut not_object = tempfile::NamedTempFile::new().unwrap();
        write!(not_object, "[1]").unwrap();
        assert!(test_request(vec![], None, Some(not_object.path()), false).is_err());
    }

    #[test]
    fn test_export_payload_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.drl");

        let out = export_payload(b"rule end".to_vec(), Some(&path)).unwrap();
        assert_eq!(out["bytes"], 8);
        assert_eq!(fs::read(&path).unwrap(), b"rule end");

        let inline = export_payload(b"abc".to_vec(), None).unwrap();
        assert_eq!(inline["content"], "abc");
    }
}
