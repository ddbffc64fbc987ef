//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire configuration, logging and the combined store together.
//! - Run one insert, get and caption replacement cycle and print each
//!   record as a JSON line.
//!
//! Usage: `captionstore_cli [tenant] [url] [caption...]`
//!
//! Without explicit captions, `captions_per_record` captions are generated
//! from the URL path segments.

use captionstore_core::{
    init_logging_from_config, open_store, MemoizedCaptionGenerator, Record, RecordService,
    ServiceError, StoreConfig, StoreError, SummarizeRequest,
};
use std::process::ExitCode;

const DEFAULT_TENANT: &str = "cli-smoke";
const DEFAULT_URL: &str = "http://example.com";

fn main() -> ExitCode {
    println!("captionstore_core ping={}", captionstore_core::ping());
    println!("captionstore_core version={}", captionstore_core::core_version());

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    let store = open_store(&config).map_err(describe)?;
    let service = RecordService::new(store);

    let mut args = args.into_iter();
    let tenant = args.next().unwrap_or_else(|| DEFAULT_TENANT.to_string());
    let url = args.next().unwrap_or_else(|| DEFAULT_URL.to_string());
    let captions: Vec<String> = args.collect();

    let created = if captions.is_empty() {
        let generator = MemoizedCaptionGenerator::new(|request: &SummarizeRequest| {
            Ok(path_captions(request))
        });
        service
            .create_with_generated_captions(&tenant, &url, &generator, config.captions_per_record)
            .map_err(describe_service)?
    } else {
        service
            .create_record(&tenant, url, captions)
            .map_err(describe)?
    };
    print_record("created", &created)?;

    let id = created
        .id
        .ok_or_else(|| "store returned a record without id".to_string())?;
    let loaded = service.get_record(&tenant, id).map_err(describe)?;
    print_record("loaded", &loaded)?;

    let reversed = created.captions.iter().rev().cloned().collect();
    let updated = service
        .replace_captions(&tenant, id, reversed)
        .map_err(describe)?;
    print_record("updated", &updated)?;

    log::info!("event=cli_smoke module=cli status=ok tenant_id={tenant} record_id={id}");
    Ok(())
}

fn print_record(stage: &str, record: &Record) -> Result<(), String> {
    let json = serde_json::to_string(record).map_err(|err| err.to_string())?;
    println!("{stage} {json}");
    Ok(())
}

fn describe(err: StoreError) -> String {
    format!("status={} error={err}", err.kind().status_code())
}

fn describe_service(err: ServiceError) -> String {
    format!("status={} error={err}", err.status_code())
}

/// Offline stand-in for a summarizer: one caption per trailing path segment.
fn path_captions(request: &SummarizeRequest) -> Vec<String> {
    let without_scheme = request
        .url
        .split_once("://")
        .map_or(request.url.as_str(), |(_, rest)| rest);
    let segments: Vec<&str> = without_scheme
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    segments
        .iter()
        .rev()
        .take(request.sentence_count)
        .map(|segment| format!("About {segment}."))
        .collect()
}
