use crate::model::{Id, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Where a session is in the order flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStage {
    /// Building a cart
    Browsing,
    /// Order and invoice written, waiting for payment or cancellation
    AwaitingPayment,
}

/// One cart line, priced at the moment the item was added
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: Id,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Per-session state for the order flow. Passed explicitly through the
/// request-handling layer; there is no ambient global cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Id,
    pub role: Role,
    pub cart: HashMap<Id, CartLine>,
    pub stage: OrderStage,
    pub order_id: Option<Id>,
    pub invoice_id: Option<Id>,
    pub total_amount: f64,
}

impl Session {
    pub fn new(user_id: Id, role: Role) -> Self {
        Self {
            user_id,
            role,
            cart: HashMap::new(),
            stage: OrderStage::Browsing,
            order_id: None,
            invoice_id: None,
            total_amount: 0.0,
        }
    }

    /// Set a cart line; a quantity of zero removes the line
    pub fn set_cart_line(&mut self, line: CartLine) {
        if line.quantity == 0 {
            self.cart.remove(&line.menu_item_id);
        } else {
            self.cart.insert(line.menu_item_id, line);
        }
    }

    /// Undiscounted cart total
    pub fn cart_total(&self) -> f64 {
        self.cart
            .values()
            .map(|l| l.quantity as f64 * l.unit_price)
            .sum()
    }

    /// Drop the cart and any in-flight order state
    pub fn reset_order_flow(&mut self) {
        self.cart.clear();
        self.stage = OrderStage::Browsing;
        self.order_id = None;
        self.invoice_id = None;
        self.total_amount = 0.0;
    }
}

/// Sessions keyed by the token subject
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for a subject, replacing any previous one
    pub async fn open(&self, subject: &str, user_id: Id, role: Role) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(subject.to_string(), Session::new(user_id, role));
    }

    pub async fn get(&self, subject: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(subject).cloned()
    }

    pub async fn put(&self, subject: &str, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(subject.to_string(), session);
    }

    pub async fn close(&self, subject: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: Id, quantity: u32, unit_price: f64) -> CartLine {
        CartLine {
            menu_item_id: id,
            name: format!("item {id}"),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_cart_lines_and_total() {
        let mut session = Session::new(1, Role::Admin);
        session.set_cart_line(line(10, 2, 4.5));
        session.set_cart_line(line(11, 1, 12.0));
        assert_eq!(session.cart_total(), 21.0);

        // Zero quantity removes the line
        session.set_cart_line(line(10, 0, 4.5));
        assert_eq!(session.cart.len(), 1);
        assert_eq!(session.cart_total(), 12.0);
    }

    #[test]
    fn test_reset_order_flow() {
        let mut session = Session::new(1, Role::Admin);
        session.set_cart_line(line(10, 2, 4.5));
        session.stage = OrderStage::AwaitingPayment;
        session.order_id = Some(7);
        session.invoice_id = Some(8);
        session.total_amount = 9.0;

        session.reset_order_flow();
        assert!(session.cart.is_empty());
        assert_eq!(session.stage, OrderStage::Browsing);
        assert_eq!(session.order_id, None);
        assert_eq!(session.invoice_id, None);
        assert_eq!(session.total_amount, 0.0);
    }

    #[tokio::test]
    async fn test_registry_round_trip() {
        let registry = SessionRegistry::new();
        registry.open("user-1", 1, Role::Manager).await;

        let mut session = registry.get("user-1").await.unwrap();
        session.set_cart_line(line(5, 3, 2.0));
        registry.put("user-1", session).await;

        assert_eq!(registry.get("user-1").await.unwrap().cart_total(), 6.0);
        registry.close("user-1").await;
        assert!(registry.get("user-1").await.is_none());
    }
}
