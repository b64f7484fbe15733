use std::{cell::RefCell, collections::VecDeque, time::Duration};

use async_trait::async_trait;

use crate::{
    service::{ConverterService, ServiceError, TransformKind},
    surface::{Document, Node},
};

struct Reply {
    delay: Duration,
    result: Result<String, ServiceError>,
}

/// Converter that answers from a script, in call order.
///
/// Runs out of script as a transport failure.
#[derive(Default)]
pub struct FakeService {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<(TransformKind, String)>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, delay_ms: u64, result: Result<&str, ServiceError>) -> Self {
        self.replies.borrow_mut().push_back(Reply {
            delay: Duration::from_millis(delay_ms),
            result: result.map(str::to_string),
        });
        self
    }

    pub fn calls(&self) -> Vec<(TransformKind, String)> {
        self.calls.borrow().clone()
    }

    async fn answer(&self, kind: TransformKind, text: &str) -> Result<String, ServiceError> {
        self.calls.borrow_mut().push((kind, text.to_string()));
        let reply = self.replies.borrow_mut().pop_front();
        let Some(reply) = reply else {
            return Err(ServiceError::TransportFailure("no scripted reply".into()));
        };
        tokio::time::sleep(reply.delay).await;
        reply.result
    }
}

#[async_trait(?Send)]
impl ConverterService for FakeService {
    async fn convert(&self, text: &str) -> Result<String, ServiceError> {
        self.answer(TransformKind::Convert, text).await
    }

    async fn translate(&self, text: &str) -> Result<String, ServiceError> {
        self.answer(TransformKind::Translate, text).await
    }

    async fn rephrase(&self, text: &str) -> Result<String, ServiceError> {
        self.answer(TransformKind::Rephrase, text).await
    }
}

/// Appends `node` to the body and focuses it.
pub fn mount(doc: &mut Document, node: Node) -> Node {
    let body = doc.body().clone();
    doc.append_child(&body, &node);
    doc.focus(&node);
    node
}
