//! Metric families produced by one transformation pass.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Ordered label names of a family. Always starts with `cluster`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema(Vec<String>);

impl LabelSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.0.push(name.into());
        self
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One cumulative histogram bucket; the last bucket of a sample has an
/// infinite upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub upper_bound: f64,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Gauge {
        labels: Vec<String>,
        value: f64,
    },
    Histogram {
        labels: Vec<String>,
        buckets: Vec<Bucket>,
        sum: f64,
    },
}

impl Sample {
    pub fn labels(&self) -> &[String] {
        match self {
            Sample::Gauge { labels, .. } | Sample::Histogram { labels, .. } => labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    name: String,
    help: String,
    schema: LabelSchema,
    kind: MetricKind,
    samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        schema: LabelSchema,
        kind: MetricKind,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            schema,
            kind,
            samples: Vec::new(),
        }
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>, schema: LabelSchema) -> Self {
        Self::new(name, help, schema, MetricKind::Gauge)
    }

    pub fn histogram(
        name: impl Into<String>,
        help: impl Into<String>,
        schema: LabelSchema,
    ) -> Self {
        Self::new(name, help, schema, MetricKind::Histogram)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Appends a gauge sample. Samples whose label count does not match the
    /// schema are dropped, so the family never carries a malformed sample.
    pub fn add_gauge(&mut self, labels: Vec<String>, value: f64) -> bool {
        if !self.accepts(MetricKind::Gauge, &labels) {
            return false;
        }
        self.samples.push(Sample::Gauge { labels, value });
        true
    }

    /// Appends a histogram sample. Buckets must be ordered by upper bound and
    /// end with `+Inf`.
    pub fn add_histogram(&mut self, labels: Vec<String>, buckets: Vec<Bucket>, sum: f64) -> bool {
        if !self.accepts(MetricKind::Histogram, &labels) {
            return false;
        }
        let ordered = buckets
            .windows(2)
            .all(|pair| pair[0].upper_bound <= pair[1].upper_bound);
        let terminated = buckets
            .last()
            .map(|b| b.upper_bound == f64::INFINITY)
            .unwrap_or(false);
        if !ordered || !terminated {
            warn!("family {}: dropping histogram sample with malformed buckets", self.name);
            return false;
        }
        self.samples.push(Sample::Histogram {
            labels,
            buckets,
            sum,
        });
        true
    }

    fn accepts(&self, kind: MetricKind, labels: &[String]) -> bool {
        if self.kind != kind {
            warn!(
                "family {}: refusing {} sample on a {} family",
                self.name,
                kind.as_str(),
                self.kind.as_str()
            );
            return false;
        }
        if labels.len() != self.schema.len() {
            warn!(
                "family {}: expected {} label values, got {}",
                self.name,
                self.schema.len(),
                labels.len()
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_rejects_label_count_mismatch() {
        let mut family = MetricFamily::gauge("x", "help", LabelSchema::new(["cluster", "host"]));
        assert!(!family.add_gauge(labels(&["c"]), 1.0));
        assert!(family.add_gauge(labels(&["c", "h"]), 1.0));
        assert_eq!(family.samples().len(), 1);
    }

    #[test]
    fn test_rejects_unterminated_histogram() {
        let mut family = MetricFamily::histogram("x", "help", LabelSchema::new(["cluster"]));
        let open = vec![Bucket {
            upper_bound: 0.5,
            count: 1.0,
        }];
        assert!(!family.add_histogram(labels(&["c"]), open, 1.0));

        let closed = vec![
            Bucket {
                upper_bound: 0.5,
                count: 1.0,
            },
            Bucket {
                upper_bound: f64::INFINITY,
                count: 1.0,
            },
        ];
        assert!(family.add_histogram(labels(&["c"]), closed, 1.0));
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let mut family = MetricFamily::histogram("x", "help", LabelSchema::new(["cluster"]));
        assert!(!family.add_gauge(labels(&["c"]), 1.0));
    }
}
