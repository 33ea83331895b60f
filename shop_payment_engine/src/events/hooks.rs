use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{DeliveryFailedEvent, EventHandler, EventProducer, Handler, ProductDeliveredEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub product_delivered_producer: Vec<EventProducer<ProductDeliveredEvent>>,
    pub delivery_failed_producer: Vec<EventProducer<DeliveryFailedEvent>>,
}

pub struct EventHandlers {
    pub on_product_delivered: Option<EventHandler<ProductDeliveredEvent>>,
    pub on_delivery_failed: Option<EventHandler<DeliveryFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_product_delivered = hooks.on_product_delivered.map(|f| EventHandler::new(buffer_size, f));
        let on_delivery_failed = hooks.on_delivery_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_product_delivered, on_delivery_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_product_delivered {
            result.product_delivered_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_delivery_failed {
            result.delivery_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_product_delivered {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_delivery_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_product_delivered: Option<Handler<ProductDeliveredEvent>>,
    pub on_delivery_failed: Option<Handler<DeliveryFailedEvent>>,
}

impl EventHooks {
    pub fn on_product_delivered<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ProductDeliveredEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_product_delivered = Some(Arc::new(f));
        self
    }

    pub fn on_delivery_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DeliveryFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_delivery_failed = Some(Arc::new(f));
        self
    }
}
