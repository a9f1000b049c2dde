use shared_types::NodeAvailability;

/// Accumulates pings until a batch is full or a flush is forced.
#[derive(Debug)]
pub struct Batcher {
    limit: usize,
    pending: Vec<NodeAvailability>,
}

impl Batcher {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            pending: Vec::with_capacity(limit),
        }
    }

    /// Adds a ping; returns the full batch once `limit` is reached.
    pub fn push(&mut self, record: NodeAvailability) -> Option<Vec<NodeAvailability>> {
        self.pending.push(record);
        if self.pending.len() >= self.limit {
            Some(self.take())
        } else {
            None
        }
    }

    /// Hands over whatever is pending. Empty if nothing is.
    pub fn take(&mut self) -> Vec<NodeAvailability> {
        std::mem::replace(&mut self.pending, Vec::with_capacity(self.limit))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
