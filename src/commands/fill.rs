use anyhow::Result;
use tracing::info;

use crate::commands::utils::{self, SessionArgs};
use crate::filler::FillConfig;
use crate::runner;
use crate::types::{FieldMode, FillOutcome, FillRequest, LocatorStrategy};

#[allow(clippy::too_many_arguments)]
pub async fn handle_fill(
    strategy: LocatorStrategy,
    locator: String,
    value: String,
    mode: FieldMode,
    url: Option<String>,
    session: SessionArgs,
    config: FillConfig,
) -> Result<()> {
    info!("Filling {}='{}' ({})", strategy, locator, mode);

    let mut filler = utils::start_session(&session, config).await?;

    if let Some(url) = &url {
        filler.page().goto(url).await?;
    }

    let request = FillRequest::new(strategy, locator, value, mode);
    let result = runner::fill_with_retry(&mut filler, &request).await;

    match result {
        Ok(report) => {
            let outcome = FillOutcome::success(report.message());
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err)),
    }
}
