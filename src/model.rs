use crate::utils::time::RawTime;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier handed out by the datastore
pub type Id = u64;

/// Roles that can log in to the back office
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }

    /// Parse a role name as submitted by the login form
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }
}

/// A login account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Id,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// A staff member. Staff roles are free-form names: new ones (for example
/// "Chef") can be created when adding staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Id,
    pub name: String,
    pub phone: String,
    pub salary: f64,
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Id,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Available,
    Reserved,
}

/// A physical table in the dining room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: Id,
    pub table_number: u32,
    pub seating_capacity: u32,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Reserved,
    Cancelled,
}

/// A table reservation. The reserved period is persisted as its encoded
/// "HH:MM-HH:MM" slot token and decoded on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Id,
    pub customer_id: Id,
    pub table_id: Id,
    pub reservation_date: NaiveDate,
    pub time_slot: String,
    pub guest_count: u32,
    pub status: ReservationStatus,
}

/// A hosted event. Start and end are kept in whatever shape the driver
/// returned them; they are normalized on read and written back as HH:MM:SS.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Id,
    pub name: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub start_time: RawTime,
    pub end_time: RawTime,
    pub created_by_staff_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBooking {
    pub id: Id,
    pub event_id: Id,
    pub customer_id: Id,
    pub booking_date: NaiveDate,
    pub guest_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Id,
    pub name: String,
    pub price: f64,
    pub category_id: Id,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Id,
    pub staff_id: Id,
    pub customer_id: Id,
    pub order_time: NaiveDateTime,
    pub status: OrderStatus,
}

/// One ordered menu item with the unit price charged at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: Id,
    pub menu_item_id: Id,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: Id,
    pub code: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Id,
    pub order_id: Id,
    pub total_amount: f64,
    pub discount_id: Option<Id>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Upi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Id,
    pub invoice_id: Id,
    pub amount_paid: f64,
    pub method: PaymentMethod,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Id,
    pub item_name: String,
    pub unit: String,
    pub current_quantity: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Id,
    pub name: String,
    pub phone: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStatus {
    Ordered,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Id,
    pub supplier_id: Id,
    pub staff_id: Id,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub purchase_id: Id,
    pub item_id: Id,
    pub quantity: f64,
    pub price_per_unit: f64,
}

/// A scheduled staff shift. Times share the [`RawTime`] treatment with
/// events: heterogeneous on read, HH:MM:SS on write.
#[derive(Debug, Clone)]
pub struct Shift {
    pub id: Id,
    pub staff_id: Id,
    pub shift_date: NaiveDate,
    pub start_time: RawTime,
    pub end_time: RawTime,
}
