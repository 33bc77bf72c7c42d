use crate::metrics::descriptor::{Descriptor, ValueKind};

/// One metric value produced by a collection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub descriptor: &'a Descriptor,
    pub kind: ValueKind,
    pub value: f64,
}

/// Every sample of one pass, in descriptor order.
///
/// Borrows the descriptor table it was built from and is dropped once
/// encoded.
#[derive(Debug, Clone, Default)]
pub struct MetricBatch<'a> {
    samples: Vec<Sample<'a>>,
}

impl<'a> MetricBatch<'a> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, descriptor: &'a Descriptor, value: f64) {
        self.samples.push(Sample {
            descriptor,
            kind: descriptor.kind(),
            value,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample<'a>> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Looks up a sample by fully qualified name.
    pub fn get(&self, fq_name: &str) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.descriptor.fq_name() == fq_name)
            .map(|s| s.value)
    }
}

impl<'a> IntoIterator for MetricBatch<'a> {
    type Item = Sample<'a>;
    type IntoIter = std::vec::IntoIter<Sample<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}
