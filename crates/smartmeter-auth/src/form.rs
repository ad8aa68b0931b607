//! Login form scraping and submission.
//!
//! Every login page carries a form whose `action` embeds a one-time session
//! token. The target is read from the page it came with and used for exactly
//! one POST.

use reqwest::Response;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AuthError, Result};
use crate::transport::HttpClient;

/// Find the submission target of the first `<form>` in `html`.
///
/// Relative targets are resolved against `page_url`, as a browser would.
pub fn find_form_action(html: &str, page_url: &Url) -> Result<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("form")
        .map_err(|e| AuthError::FormNotFound(format!("invalid form selector: {}", e)))?;

    let form = document
        .select(&selector)
        .next()
        .ok_or_else(|| AuthError::FormNotFound("page contains no <form>".to_string()))?;

    let action = form
        .value()
        .attr("action")
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .ok_or_else(|| AuthError::FormNotFound("form has no action".to_string()))?;

    page_url.join(action).map_err(|e| {
        AuthError::FormNotFound(format!("form action '{}' is not a valid URL: {}", action, e))
    })
}

/// Scrape the form out of `page` and POST a single `field=value` pair to it.
///
/// The POST does not follow redirects; the caller gets whatever the
/// provider answered, including a redirect with its `Location` intact.
pub async fn submit_field(
    client: &HttpClient,
    page: Response,
    field: &str,
    value: &str,
) -> Result<Response> {
    let page_url = page.url().clone();
    let body = page.text().await?;
    let action = find_form_action(&body, &page_url)?;

    tracing::trace!(field, path = %action.path(), "Submitting login form");

    client
        .without_redirect()?
        .post_form(action, &[(field, value)])
        .await
}
