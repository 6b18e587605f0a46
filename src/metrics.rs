use crate::twoface::Fallible;
use prometheus::Encoder;
use std::future::Future;
use std::time::Instant;

lazy_static! {

    pub static ref CALL_SECS: prometheus::HistogramVec = register_histogram_vec!(
        "feedsync_call_secs",
        "Seconds taken for each outbound call, partitioned by endpoint name",
        &["endpoint_name"],
        vec![0.05, 0.25, 1.0, 4.0, 16.0] // Prometheus buckets
    )
    .expect("couldn't make CALL_SECS");

    pub static ref CALLS: prometheus::IntCounterVec = register_int_counter_vec!(
        "feedsync_calls",
        "How many calls returned Ok/Err per endpoint",
        &["endpoint_name", "result"]
    )
    .expect("couldn't make CALLS");

    pub static ref STALE_FETCHES: prometheus::IntCounter = register_int_counter!(
        "feedsync_stale_fetches",
        "Feed fetches whose result was discarded because a newer fetch had started"
    )
    .expect("couldn't make STALE_FETCHES");
}

/// Execute the closure, then log its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
pub async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    CALL_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    CALLS
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn gather() -> anyhow::Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
