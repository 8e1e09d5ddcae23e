//! Submits one sample document through a rate-limited submitter.
//!
//! The endpoint defaults to the production one; point it elsewhere with
//! `DOCUMENT_ENDPOINT`. Log verbosity follows `RUST_LOG` (default `info`).

use chrono::NaiveDate;
use document_throttle::{Description, Document, DocumentSubmitter, Product, WindowUnit};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn sample_document() -> Document {
    let date = NaiveDate::from_ymd_opt(2020, 1, 23);

    Document {
        description: Some(Description {
            participant_inn: Some("participant_inn_value".to_string()),
        }),
        doc_id: Some("12345".to_string()),
        doc_status: Some("ACTIVE".to_string()),
        doc_type: Some("LP_INTRODUCE_GOODS".to_string()),
        import_request: true,
        owner_inn: Some("owner_inn_value".to_string()),
        participant_inn: Some("participant_inn_value".to_string()),
        producer_inn: Some("producer_inn_value".to_string()),
        production_date: date,
        production_type: Some("type_value".to_string()),
        products: Vec::new(),
        reg_date: date,
        reg_number: Some("reg_number".to_string()),
    }
    .with_product(Product {
        certificate_document: Some("doc".to_string()),
        certificate_document_date: date,
        certificate_document_number: Some("123".to_string()),
        owner_inn: Some("owner_inn".to_string()),
        producer_inn: Some("producer_inn".to_string()),
        production_date: date,
        tnved_code: Some("tnved".to_string()),
        uit_code: Some("uit".to_string()),
        uitu_code: Some("uitu".to_string()),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut builder = DocumentSubmitter::builder()
        .with_capacity(10)
        .with_window_unit(WindowUnit::Minute);
    if let Ok(endpoint) = std::env::var("DOCUMENT_ENDPOINT") {
        builder = builder.with_endpoint(endpoint);
    }
    let submitter = builder.build()?;

    let result = submitter.submit(&sample_document(), "signature_value").await;
    match &result {
        Ok(()) => info!("document submitted"),
        Err(e) => error!(error = %e, "document submission failed"),
    }

    let snapshot = submitter.metrics().snapshot();
    info!(
        granted = snapshot.permits_granted,
        accepted = snapshot.submissions_accepted,
        rejected = snapshot.submissions_rejected,
        "done"
    );

    submitter.shutdown().await?;
    result.map_err(Into::into)
}
