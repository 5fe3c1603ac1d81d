use pipeline_model::{OrderResponse, RequestId};
use std::collections::{HashMap, VecDeque};

/// The handler's bounded cache of recently-seen `request_id`s (spec.md
/// §4.D): a repeat `send_order` with a known id returns the cached response
/// without re-submitting to the broker.
///
/// Eviction is oldest-inserted-first rather than strict least-recently-used
/// on read — at this cache's scale (one entry per order attempt, capacity
/// 4,096) the two policies only differ for ids that are both re-read *and*
/// outlive thousands of newer orders, which an at-most-once dedupe window
/// never needs to do.
#[derive(Debug)]
pub struct RequestDedupeCache {
    capacity: usize,
    order: VecDeque<RequestId>,
    entries: HashMap<RequestId, OrderResponse>,
}

impl RequestDedupeCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, request_id: RequestId) -> Option<OrderResponse> {
        self.entries.get(&request_id).cloned()
    }

    pub fn insert(&mut self, request_id: RequestId, response: OrderResponse) {
        if self.entries.contains_key(&request_id) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(request_id);
        self.entries.insert(request_id, response);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
