//! Prometheus text exposition (version 0.0.4) of metric families.

use std::collections::HashMap;

use prometheus::proto;
use prometheus::{Encoder, TextEncoder};
use tracing::debug;

use crate::engine::family::{MetricFamily, MetricKind, Sample};
use crate::error::Result;

/// Renders families with the prometheus text encoder.
pub fn render<'a, I>(families: I) -> Result<String>
where
    I: IntoIterator<Item = &'a MetricFamily>,
{
    let families = to_proto(families);
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Converts families in first-seen order. Families sharing a name (the same
/// service scraped on several hosts, or two categories exporting one key)
/// become one protobuf family under the first family's HELP and TYPE.
/// Families without samples are skipped, the encoder rejects them.
pub fn to_proto<'a, I>(families: I) -> Vec<proto::MetricFamily>
where
    I: IntoIterator<Item = &'a MetricFamily>,
{
    let mut out: Vec<proto::MetricFamily> = Vec::new();
    let mut by_name: HashMap<&str, (usize, MetricKind)> = HashMap::new();
    for family in families {
        if family.samples().is_empty() {
            continue;
        }
        let index = match by_name.get(family.name()) {
            Some(&(index, kind)) if kind == family.kind() => index,
            Some(_) => {
                debug!("exposition: skipping {} with conflicting type", family.name());
                continue;
            }
            None => {
                by_name.insert(family.name(), (out.len(), family.kind()));
                out.push(header(family));
                out.len() - 1
            }
        };
        let names = family.schema().names();
        for sample in family.samples() {
            out[index].mut_metric().push(metric(names, sample));
        }
    }
    out
}

fn header(family: &MetricFamily) -> proto::MetricFamily {
    let mut mf = proto::MetricFamily::default();
    mf.set_name(family.name().to_string());
    mf.set_help(family.help().to_string());
    mf.set_field_type(match family.kind() {
        MetricKind::Gauge => proto::MetricType::GAUGE,
        MetricKind::Histogram => proto::MetricType::HISTOGRAM,
    });
    mf
}

fn metric(names: &[String], sample: &Sample) -> proto::Metric {
    let mut metric = proto::Metric::default();
    for (name, value) in names.iter().zip(sample.labels()) {
        let mut pair = proto::LabelPair::default();
        pair.set_name(name.clone());
        pair.set_value(value.clone());
        metric.mut_label().push(pair);
    }
    match sample {
        Sample::Gauge { value, .. } => {
            let mut gauge = proto::Gauge::default();
            gauge.set_value(*value);
            metric.set_gauge(gauge);
        }
        Sample::Histogram { buckets, sum, .. } => {
            let mut histogram = proto::Histogram::default();
            // The encoder writes the +Inf bucket from the sample count.
            for bucket in buckets.iter().filter(|b| b.upper_bound.is_finite()) {
                let mut b = proto::Bucket::default();
                b.set_upper_bound(bucket.upper_bound);
                b.set_cumulative_count(count(bucket.count));
                histogram.mut_bucket().push(b);
            }
            histogram.set_sample_count(buckets.last().map_or(0, |b| count(b.count)));
            histogram.set_sample_sum(*sum);
            metric.set_histogram(histogram);
        }
    }
    metric
}

fn count(value: f64) -> u64 {
    value.max(0.0).round() as u64
}
