use crate::domain::model::Link;
use crate::domain::ports::Browser;
use crate::utils::error::Result;
use std::time::Duration;

const MIN_POLL: Duration = Duration::from_millis(1);

/// Polls `selector` until some link satisfies `ready` or `budget` worth of
/// sleeping has been spent, then returns the last snapshot either way.
///
/// The budget counts only time slept between polls, so a page that never
/// matches costs at most `budget` of waiting plus the queries themselves.
pub async fn wait_for_links<B, P>(
    browser: &mut B,
    selector: &str,
    budget: Duration,
    poll_interval: Duration,
    ready: P,
) -> Result<Vec<Link>>
where
    B: Browser + ?Sized,
    P: Fn(&Link) -> bool,
{
    let mut waited = Duration::ZERO;

    loop {
        let links = browser.find_elements(selector).await?;
        if links.iter().any(&ready) || waited >= budget {
            tracing::debug!(
                "'{}' settled with {} element(s) after {:?}",
                selector,
                links.len(),
                waited
            );
            return Ok(links);
        }

        let step = poll_interval.max(MIN_POLL).min(budget - waited);
        browser.sleep(step).await;
        waited += step;
    }
}
