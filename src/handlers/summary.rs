use super::{account, ApiError};
use crate::{
    context::Context,
    dates,
    journal_storage::EntryStats,
    summary::{self, DateRange, RangeQuery},
    templates,
    user_storage::UserId,
};
use std::str::FromStr;
use warp::{http::StatusCode, reject, Rejection, Reply};

const DEFAULT_RANGE_DAYS: i64 = 30;

/// The dashboard's JSON endpoints, `/api/summary/<metric>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Aggregates,
    EntryFrequency,
    CategoryDistribution,
    WordCountTrends,
    SentimentSummary,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown metric")]
pub struct UnknownMetric;

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "aggregates" => Metric::Aggregates,
            "entry-frequency" => Metric::EntryFrequency,
            "category-distribution" => Metric::CategoryDistribution,
            "word-count-trends" => Metric::WordCountTrends,
            "sentiment-summary" => Metric::SentimentSummary,
            _ => return Err(UnknownMetric),
        })
    }
}

async fn entries(
    ctx: &Context,
    user_id: UserId,
    range: &DateRange,
) -> Result<Vec<EntryStats>, Rejection> {
    ctx.journals
        .entries_between(user_id, range)
        .await
        .map_err(reject::custom)
}

async fn category_names(ctx: &Context) -> Result<Vec<String>, Rejection> {
    Ok(ctx
        .journals
        .categories()
        .await
        .map_err(reject::custom)?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

pub async fn metric(
    metric: Metric,
    ctx: Context,
    user_id: UserId,
    query: RangeQuery,
) -> Result<impl Reply, Rejection> {
    let range = DateRange::from_query(&query)
        .map_err(|e| reject::custom(ApiError::BadRequest(e.to_string())))?;
    let entries = entries(&ctx, user_id, &range).await?;

    Ok(match metric {
        Metric::Aggregates => warp::reply::json(&summary::aggregates(&entries)),
        Metric::EntryFrequency => warp::reply::json(&summary::entry_frequency(&entries)),
        Metric::CategoryDistribution => {
            let names = category_names(&ctx).await?;
            warp::reply::json(&summary::category_distribution(
                names.iter().map(String::as_str),
                &entries,
            ))
        }
        Metric::WordCountTrends => warp::reply::json(&summary::word_count_trends(&entries)),
        Metric::SentimentSummary => warp::reply::json(&summary::sentiment_summary(&entries)),
    })
}

/// HTML rendition of all five metrics, defaulting to the last 30 days.
pub async fn page(
    ctx: Context,
    user_id: UserId,
    query: RangeQuery,
) -> Result<impl Reply, Rejection> {
    let account = account(&ctx, user_id).await?;

    let range = if query.start_date.is_none() && query.end_date.is_none() {
        let today = time::OffsetDateTime::now_utc().date();
        Ok(DateRange::trailing(today, DEFAULT_RANGE_DAYS))
    } else {
        DateRange::from_query(&query)
    };

    let range = match range {
        Ok(range) => range,
        Err(e) => {
            let error = e.to_string();
            return Ok(render!(
                StatusCode::BAD_REQUEST,
                templates::Summaries {
                    site: ctx.site(Some(&account)),
                    start_date: query.start_date.as_deref().unwrap_or(""),
                    end_date: query.end_date.as_deref().unwrap_or(""),
                    error: Some(&error),
                    aggregates: None,
                    frequency: &[],
                    categories: &[],
                    sentiments: &[],
                    word_trends: &[],
                }
            ));
        }
    };

    let entries = entries(&ctx, user_id, &range).await?;
    let names = category_names(&ctx).await?;
    let aggregates = summary::aggregates(&entries);

    Ok(render!(templates::Summaries {
        site: ctx.site(Some(&account)),
        start_date: &dates::day(range.start),
        end_date: &dates::day(range.end),
        error: None,
        aggregates: Some(&aggregates),
        frequency: &summary::entry_frequency(&entries),
        categories: &summary::category_distribution(names.iter().map(String::as_str), &entries),
        sentiments: &summary::sentiment_summary(&entries),
        word_trends: &summary::word_count_trends(&entries),
    }))
}

