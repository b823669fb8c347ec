use crate::error::{not_found, AppResult};
use crate::model::*;
use crate::utils::time::RawTime;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Datastore trait for the back office. The relational backend lives behind
/// this seam; every operation maps to a single statement on it, so the trait
/// promises nothing across calls.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    // --- accounts ---
    async fn find_user(&self, username: &str) -> AppResult<Option<UserAccount>>;
    async fn add_user(&self, username: &str, password: &str, role: Role) -> AppResult<Id>;

    // --- staff ---
    async fn list_staff(
        &self,
        name_filter: Option<&str>,
        role_filter: Option<&str>,
    ) -> AppResult<Vec<Staff>>;
    async fn get_staff(&self, id: Id) -> AppResult<Option<Staff>>;
    async fn add_staff(
        &self,
        name: &str,
        phone: &str,
        salary: f64,
        role_name: &str,
    ) -> AppResult<Id>;
    async fn update_staff(&self, id: Id, name: &str, phone: &str, salary: f64) -> AppResult<()>;
    async fn delete_staff(&self, id: Id) -> AppResult<()>;
    async fn list_role_names(&self) -> AppResult<Vec<String>>;

    // --- customers ---
    async fn add_customer(&self, name: &str, phone: &str) -> AppResult<Id>;
    async fn get_customer(&self, id: Id) -> AppResult<Option<Customer>>;

    // --- tables ---
    async fn list_tables(&self, status: Option<TableStatus>) -> AppResult<Vec<DiningTable>>;
    async fn add_table(&self, table_number: u32, seating_capacity: u32) -> AppResult<Id>;
    async fn set_table_status(&self, id: Id, status: TableStatus) -> AppResult<()>;

    // --- reservations ---
    async fn list_reservations(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<Reservation>>;
    async fn get_reservation(&self, id: Id) -> AppResult<Option<Reservation>>;
    async fn add_reservation(
        &self,
        customer_id: Id,
        table_id: Id,
        date: NaiveDate,
        time_slot: &str,
        guest_count: u32,
    ) -> AppResult<Id>;
    async fn update_reservation(
        &self,
        id: Id,
        date: NaiveDate,
        time_slot: &str,
        guest_count: u32,
    ) -> AppResult<()>;
    async fn set_reservation_status(&self, id: Id, status: ReservationStatus) -> AppResult<()>;

    // --- events ---
    async fn list_events_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Event>>;
    async fn get_event(&self, id: Id) -> AppResult<Option<Event>>;
    async fn add_event(
        &self,
        name: &str,
        location: &str,
        date: NaiveDate,
        start_time: RawTime,
        end_time: RawTime,
        created_by_staff_id: Id,
    ) -> AppResult<Id>;
    async fn update_event(
        &self,
        id: Id,
        name: &str,
        location: &str,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<()>;
    async fn delete_event(&self, id: Id) -> AppResult<()>;
    async fn add_event_booking(
        &self,
        event_id: Id,
        customer_id: Id,
        booking_date: NaiveDate,
        guest_count: u32,
    ) -> AppResult<Id>;
    async fn bookings_for_event(&self, event_id: Id) -> AppResult<Vec<EventBooking>>;

    // --- menu ---
    async fn list_menu_categories(&self) -> AppResult<Vec<MenuCategory>>;
    async fn add_menu_category(&self, name: &str) -> AppResult<Id>;
    async fn list_menu_items(
        &self,
        category_id: Option<Id>,
        only_available: bool,
    ) -> AppResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: Id) -> AppResult<Option<MenuItem>>;
    async fn add_menu_item(&self, name: &str, price: f64, category_id: Id) -> AppResult<Id>;
    async fn update_menu_item(
        &self,
        id: Id,
        name: &str,
        price: f64,
        is_available: bool,
    ) -> AppResult<()>;
    async fn find_discount(&self, code: &str) -> AppResult<Option<Discount>>;
    async fn add_discount(&self, code: &str, percentage: f64) -> AppResult<Id>;

    // --- orders ---
    async fn add_order(
        &self,
        staff_id: Id,
        customer_id: Id,
        order_time: NaiveDateTime,
    ) -> AppResult<Id>;
    async fn get_order(&self, id: Id) -> AppResult<Option<Order>>;
    async fn set_order_status(&self, id: Id, status: OrderStatus) -> AppResult<()>;
    async fn add_order_line(&self, line: OrderLine) -> AppResult<()>;
    async fn lines_for_order(&self, order_id: Id) -> AppResult<Vec<OrderLine>>;
    async fn orders_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Order>>;
    async fn add_invoice(
        &self,
        order_id: Id,
        total_amount: f64,
        discount_id: Option<Id>,
        created_at: NaiveDateTime,
    ) -> AppResult<Id>;
    async fn get_invoice(&self, id: Id) -> AppResult<Option<Invoice>>;
    async fn add_payment(
        &self,
        invoice_id: Id,
        amount_paid: f64,
        method: PaymentMethod,
        paid_at: NaiveDateTime,
    ) -> AppResult<Id>;

    // --- inventory ---
    async fn inventory_categories(&self) -> AppResult<Vec<String>>;
    async fn list_inventory(&self, category: Option<&str>) -> AppResult<Vec<InventoryItem>>;
    async fn add_inventory_item(
        &self,
        item_name: &str,
        unit: &str,
        current_quantity: f64,
        category: &str,
    ) -> AppResult<Id>;
    async fn update_inventory_item(
        &self,
        id: Id,
        item_name: &str,
        unit: &str,
        current_quantity: f64,
    ) -> AppResult<()>;
    async fn delete_inventory_item(&self, id: Id) -> AppResult<()>;

    // --- suppliers ---
    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>>;
    async fn get_supplier(&self, id: Id) -> AppResult<Option<Supplier>>;
    async fn add_supplier(&self, name: &str, phone: &str, category: &str) -> AppResult<Id>;
    async fn update_supplier(
        &self,
        id: Id,
        name: &str,
        phone: &str,
        category: &str,
    ) -> AppResult<()>;

    // --- purchases ---
    async fn add_purchase(
        &self,
        supplier_id: Id,
        staff_id: Id,
        purchase_date: NaiveDate,
        status: PurchaseStatus,
        total_amount: f64,
    ) -> AppResult<Id>;
    async fn add_purchase_line(&self, line: PurchaseLine) -> AppResult<()>;
    async fn purchases_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Purchase>>;
    async fn lines_for_purchase(&self, purchase_id: Id) -> AppResult<Vec<PurchaseLine>>;
    async fn set_purchase_status(&self, id: Id, status: PurchaseStatus) -> AppResult<()>;

    // --- shifts ---
    async fn shifts_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Shift>>;
    async fn shifts_for_staff(&self, staff_id: Id) -> AppResult<Vec<Shift>>;
    async fn add_shift(
        &self,
        staff_id: Id,
        shift_date: NaiveDate,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<Id>;
    async fn update_shift_times(
        &self,
        id: Id,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<()>;
    async fn delete_shift(&self, id: Id) -> AppResult<()>;
}

#[derive(Debug, Default)]
struct Tables {
    next_id: Id,
    users: HashMap<Id, UserAccount>,
    staff: HashMap<Id, Staff>,
    customers: HashMap<Id, Customer>,
    dining_tables: HashMap<Id, DiningTable>,
    reservations: HashMap<Id, Reservation>,
    events: HashMap<Id, Event>,
    event_bookings: HashMap<Id, EventBooking>,
    menu_categories: HashMap<Id, MenuCategory>,
    menu_items: HashMap<Id, MenuItem>,
    discounts: HashMap<Id, Discount>,
    orders: HashMap<Id, Order>,
    order_lines: Vec<OrderLine>,
    invoices: HashMap<Id, Invoice>,
    payments: HashMap<Id, Payment>,
    inventory: HashMap<Id, InventoryItem>,
    suppliers: HashMap<Id, Supplier>,
    purchases: HashMap<Id, Purchase>,
    purchase_lines: Vec<PurchaseLine>,
    shifts: HashMap<Id, Shift>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of the datastore
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn find_user(&self, username: &str) -> AppResult<Option<UserAccount>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn add_user(&self, username: &str, password: &str, role: Role) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.users.insert(
            id,
            UserAccount {
                id,
                username: username.to_string(),
                password: password.to_string(),
                role,
            },
        );
        Ok(id)
    }

    async fn list_staff(
        &self,
        name_filter: Option<&str>,
        role_filter: Option<&str>,
    ) -> AppResult<Vec<Staff>> {
        let tables = self.tables.read().await;
        let name_filter = name_filter.map(str::to_lowercase);
        let mut staff: Vec<Staff> = tables
            .staff
            .values()
            .filter(|s| match &name_filter {
                Some(needle) => s.name.to_lowercase().contains(needle),
                None => true,
            })
            .filter(|s| match role_filter {
                Some(role) => s.role_name == role,
                None => true,
            })
            .cloned()
            .collect();
        staff.sort_by_key(|s| s.id);
        Ok(staff)
    }

    async fn get_staff(&self, id: Id) -> AppResult<Option<Staff>> {
        let tables = self.tables.read().await;
        Ok(tables.staff.get(&id).cloned())
    }

    async fn add_staff(
        &self,
        name: &str,
        phone: &str,
        salary: f64,
        role_name: &str,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.staff.insert(
            id,
            Staff {
                id,
                name: name.to_string(),
                phone: phone.to_string(),
                salary,
                role_name: role_name.to_string(),
            },
        );
        Ok(id)
    }

    async fn update_staff(&self, id: Id, name: &str, phone: &str, salary: f64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let staff = tables.staff.get_mut(&id).ok_or_else(|| not_found("staff"))?;
        staff.name = name.to_string();
        staff.phone = phone.to_string();
        staff.salary = salary;
        Ok(())
    }

    async fn delete_staff(&self, id: Id) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.staff.remove(&id).ok_or_else(|| not_found("staff"))?;
        Ok(())
    }

    async fn list_role_names(&self) -> AppResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<String> = tables
            .staff
            .values()
            .map(|s| s.role_name.clone())
            .collect();
        roles.sort();
        roles.dedup();
        Ok(roles)
    }

    async fn add_customer(&self, name: &str, phone: &str) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.customers.insert(
            id,
            Customer {
                id,
                name: name.to_string(),
                phone: phone.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_customer(&self, id: Id) -> AppResult<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(&id).cloned())
    }

    async fn list_tables(&self, status: Option<TableStatus>) -> AppResult<Vec<DiningTable>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<DiningTable> = tables
            .dining_tables
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.table_number);
        Ok(rows)
    }

    async fn add_table(&self, table_number: u32, seating_capacity: u32) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.dining_tables.insert(
            id,
            DiningTable {
                id,
                table_number,
                seating_capacity,
                status: TableStatus::Available,
            },
        );
        Ok(id)
    }

    async fn set_table_status(&self, id: Id, status: TableStatus) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .dining_tables
            .get_mut(&id)
            .ok_or_else(|| not_found("table"))?;
        table.status = status;
        Ok(())
    }

    async fn list_reservations(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| match range {
                Some((start, end)) => r.reservation_date >= start && r.reservation_date <= end,
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn get_reservation(&self, id: Id) -> AppResult<Option<Reservation>> {
        let tables = self.tables.read().await;
        Ok(tables.reservations.get(&id).cloned())
    }

    async fn add_reservation(
        &self,
        customer_id: Id,
        table_id: Id,
        date: NaiveDate,
        time_slot: &str,
        guest_count: u32,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.reservations.insert(
            id,
            Reservation {
                id,
                customer_id,
                table_id,
                reservation_date: date,
                time_slot: time_slot.to_string(),
                guest_count,
                status: ReservationStatus::Reserved,
            },
        );
        Ok(id)
    }

    async fn update_reservation(
        &self,
        id: Id,
        date: NaiveDate,
        time_slot: &str,
        guest_count: u32,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let reservation = tables
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found("reservation"))?;
        reservation.reservation_date = date;
        reservation.time_slot = time_slot.to_string();
        reservation.guest_count = guest_count;
        Ok(())
    }

    async fn set_reservation_status(&self, id: Id, status: ReservationStatus) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let reservation = tables
            .reservations
            .get_mut(&id)
            .ok_or_else(|| not_found("reservation"))?;
        reservation.status = status;
        Ok(())
    }

    async fn list_events_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.event_date >= start && e.event_date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.event_date, e.id));
        Ok(rows)
    }

    async fn get_event(&self, id: Id) -> AppResult<Option<Event>> {
        let tables = self.tables.read().await;
        Ok(tables.events.get(&id).cloned())
    }

    async fn add_event(
        &self,
        name: &str,
        location: &str,
        date: NaiveDate,
        start_time: RawTime,
        end_time: RawTime,
        created_by_staff_id: Id,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.events.insert(
            id,
            Event {
                id,
                name: name.to_string(),
                location: location.to_string(),
                event_date: date,
                start_time,
                end_time,
                created_by_staff_id,
            },
        );
        Ok(id)
    }

    async fn update_event(
        &self,
        id: Id,
        name: &str,
        location: &str,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let event = tables.events.get_mut(&id).ok_or_else(|| not_found("event"))?;
        event.name = name.to_string();
        event.location = location.to_string();
        event.start_time = start_time;
        event.end_time = end_time;
        Ok(())
    }

    async fn delete_event(&self, id: Id) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.events.remove(&id).ok_or_else(|| not_found("event"))?;
        tables.event_bookings.retain(|_, b| b.event_id != id);
        Ok(())
    }

    async fn add_event_booking(
        &self,
        event_id: Id,
        customer_id: Id,
        booking_date: NaiveDate,
        guest_count: u32,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.event_bookings.insert(
            id,
            EventBooking {
                id,
                event_id,
                customer_id,
                booking_date,
                guest_count,
            },
        );
        Ok(id)
    }

    async fn bookings_for_event(&self, event_id: Id) -> AppResult<Vec<EventBooking>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<EventBooking> = tables
            .event_bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.id);
        Ok(rows)
    }

    async fn list_menu_categories(&self) -> AppResult<Vec<MenuCategory>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MenuCategory> = tables.menu_categories.values().cloned().collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    async fn add_menu_category(&self, name: &str) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.menu_categories.insert(
            id,
            MenuCategory {
                id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    async fn list_menu_items(
        &self,
        category_id: Option<Id>,
        only_available: bool,
    ) -> AppResult<Vec<MenuItem>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MenuItem> = tables
            .menu_items
            .values()
            .filter(|m| category_id.map_or(true, |c| m.category_id == c))
            .filter(|m| !only_available || m.is_available)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn get_menu_item(&self, id: Id) -> AppResult<Option<MenuItem>> {
        let tables = self.tables.read().await;
        Ok(tables.menu_items.get(&id).cloned())
    }

    async fn add_menu_item(&self, name: &str, price: f64, category_id: Id) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.menu_items.insert(
            id,
            MenuItem {
                id,
                name: name.to_string(),
                price,
                category_id,
                is_available: true,
            },
        );
        Ok(id)
    }

    async fn update_menu_item(
        &self,
        id: Id,
        name: &str,
        price: f64,
        is_available: bool,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let item = tables
            .menu_items
            .get_mut(&id)
            .ok_or_else(|| not_found("menu item"))?;
        item.name = name.to_string();
        item.price = price;
        item.is_available = is_available;
        Ok(())
    }

    async fn find_discount(&self, code: &str) -> AppResult<Option<Discount>> {
        let tables = self.tables.read().await;
        Ok(tables.discounts.values().find(|d| d.code == code).cloned())
    }

    async fn add_discount(&self, code: &str, percentage: f64) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.discounts.insert(
            id,
            Discount {
                id,
                code: code.to_string(),
                percentage,
            },
        );
        Ok(id)
    }

    async fn add_order(
        &self,
        staff_id: Id,
        customer_id: Id,
        order_time: NaiveDateTime,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.orders.insert(
            id,
            Order {
                id,
                staff_id,
                customer_id,
                order_time,
                status: OrderStatus::Placed,
            },
        );
        Ok(id)
    }

    async fn get_order(&self, id: Id) -> AppResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).cloned())
    }

    async fn set_order_status(&self, id: Id, status: OrderStatus) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or_else(|| not_found("order"))?;
        order.status = status;
        Ok(())
    }

    async fn add_order_line(&self, line: OrderLine) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.order_lines.push(line);
        Ok(())
    }

    async fn lines_for_order(&self, order_id: Id) -> AppResult<Vec<OrderLine>> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn orders_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| {
                let date = o.order_time.date();
                date >= start && date <= end
            })
            .cloned()
            .collect();
        rows.sort_by_key(|o| o.id);
        Ok(rows)
    }

    async fn add_invoice(
        &self,
        order_id: Id,
        total_amount: f64,
        discount_id: Option<Id>,
        created_at: NaiveDateTime,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.invoices.insert(
            id,
            Invoice {
                id,
                order_id,
                total_amount,
                discount_id,
                created_at,
            },
        );
        Ok(id)
    }

    async fn get_invoice(&self, id: Id) -> AppResult<Option<Invoice>> {
        let tables = self.tables.read().await;
        Ok(tables.invoices.get(&id).cloned())
    }

    async fn add_payment(
        &self,
        invoice_id: Id,
        amount_paid: f64,
        method: PaymentMethod,
        paid_at: NaiveDateTime,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.payments.insert(
            id,
            Payment {
                id,
                invoice_id,
                amount_paid,
                method,
                paid_at,
            },
        );
        Ok(id)
    }

    async fn inventory_categories(&self) -> AppResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<String> = tables
            .inventory
            .values()
            .map(|i| i.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn list_inventory(&self, category: Option<&str>) -> AppResult<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.id);
        Ok(rows)
    }

    async fn add_inventory_item(
        &self,
        item_name: &str,
        unit: &str,
        current_quantity: f64,
        category: &str,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.inventory.insert(
            id,
            InventoryItem {
                id,
                item_name: item_name.to_string(),
                unit: unit.to_string(),
                current_quantity,
                category: category.to_string(),
            },
        );
        Ok(id)
    }

    async fn update_inventory_item(
        &self,
        id: Id,
        item_name: &str,
        unit: &str,
        current_quantity: f64,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let item = tables
            .inventory
            .get_mut(&id)
            .ok_or_else(|| not_found("inventory item"))?;
        item.item_name = item_name.to_string();
        item.unit = unit.to_string();
        item.current_quantity = current_quantity;
        Ok(())
    }

    async fn delete_inventory_item(&self, id: Id) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .inventory
            .remove(&id)
            .ok_or_else(|| not_found("inventory item"))?;
        Ok(())
    }

    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Supplier> = tables.suppliers.values().cloned().collect();
        rows.sort_by_key(|s| s.id);
        Ok(rows)
    }

    async fn get_supplier(&self, id: Id) -> AppResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.get(&id).cloned())
    }

    async fn add_supplier(&self, name: &str, phone: &str, category: &str) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.suppliers.insert(
            id,
            Supplier {
                id,
                name: name.to_string(),
                phone: phone.to_string(),
                category: category.to_string(),
            },
        );
        Ok(id)
    }

    async fn update_supplier(
        &self,
        id: Id,
        name: &str,
        phone: &str,
        category: &str,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let supplier = tables
            .suppliers
            .get_mut(&id)
            .ok_or_else(|| not_found("supplier"))?;
        supplier.name = name.to_string();
        supplier.phone = phone.to_string();
        supplier.category = category.to_string();
        Ok(())
    }

    async fn add_purchase(
        &self,
        supplier_id: Id,
        staff_id: Id,
        purchase_date: NaiveDate,
        status: PurchaseStatus,
        total_amount: f64,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.purchases.insert(
            id,
            Purchase {
                id,
                supplier_id,
                staff_id,
                purchase_date,
                status,
                total_amount,
            },
        );
        Ok(id)
    }

    async fn add_purchase_line(&self, line: PurchaseLine) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.purchase_lines.push(line);
        Ok(())
    }

    async fn purchases_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Purchase>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Purchase> = tables
            .purchases
            .values()
            .filter(|p| p.purchase_date >= start && p.purchase_date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.purchase_date, p.id));
        Ok(rows)
    }

    async fn lines_for_purchase(&self, purchase_id: Id) -> AppResult<Vec<PurchaseLine>> {
        let tables = self.tables.read().await;
        Ok(tables
            .purchase_lines
            .iter()
            .filter(|l| l.purchase_id == purchase_id)
            .cloned()
            .collect())
    }

    async fn set_purchase_status(&self, id: Id, status: PurchaseStatus) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let purchase = tables
            .purchases
            .get_mut(&id)
            .ok_or_else(|| not_found("purchase"))?;
        purchase.status = status;
        Ok(())
    }

    async fn shifts_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Shift>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Shift> = tables
            .shifts
            .values()
            .filter(|s| s.shift_date >= start && s.shift_date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.shift_date, s.id));
        Ok(rows)
    }

    async fn shifts_for_staff(&self, staff_id: Id) -> AppResult<Vec<Shift>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Shift> = tables
            .shifts
            .values()
            .filter(|s| s.staff_id == staff_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.shift_date, s.id));
        Ok(rows)
    }

    async fn add_shift(
        &self,
        staff_id: Id,
        shift_date: NaiveDate,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<Id> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.shifts.insert(
            id,
            Shift {
                id,
                staff_id,
                shift_date,
                start_time,
                end_time,
            },
        );
        Ok(id)
    }

    async fn update_shift_times(
        &self,
        id: Id,
        start_time: RawTime,
        end_time: RawTime,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let shift = tables.shifts.get_mut(&id).ok_or_else(|| not_found("shift"))?;
        shift.start_time = start_time;
        shift.end_time = end_time;
        Ok(())
    }

    async fn delete_shift(&self, id: Id) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.shifts.remove(&id).ok_or_else(|| not_found("shift"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[tokio::test]
    async fn test_staff_crud() {
        let store = MemoryStore::new();
        let id = store
            .add_staff("Maria", "555-0101", 2400.0, "Chef")
            .await
            .unwrap();

        let found = store.list_staff(Some("mar"), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Maria");

        store
            .update_staff(id, "Maria K", "555-0102", 2500.0)
            .await
            .unwrap();
        let staff = store.get_staff(id).await.unwrap().unwrap();
        assert_eq!(staff.name, "Maria K");
        assert_eq!(staff.salary, 2500.0);

        assert_eq!(store.list_role_names().await.unwrap(), vec!["Chef"]);

        store.delete_staff(id).await.unwrap();
        assert!(store.get_staff(id).await.unwrap().is_none());
        assert!(store.delete_staff(id).await.is_err());
    }

    #[tokio::test]
    async fn test_reservation_filtering() {
        let store = MemoryStore::new();
        let customer = store.add_customer("Anu", "555-0200").await.unwrap();
        let table = store.add_table(4, 6).await.unwrap();

        let may_first = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let may_tenth = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        store
            .add_reservation(customer, table, may_first, "18:00-19:00", 4)
            .await
            .unwrap();
        store
            .add_reservation(customer, table, may_tenth, "19:00-20:00", 2)
            .await
            .unwrap();

        let all = store.list_reservations(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let single = store
            .list_reservations(Some((may_first, may_first)))
            .await
            .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].time_slot, "18:00-19:00");
    }

    #[tokio::test]
    async fn test_event_delete_cascades_bookings() {
        let store = MemoryStore::new();
        let staff = store.add_staff("Olli", "555", 2000.0, "Admin").await.unwrap();
        let customer = store.add_customer("Guest", "556").await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = RawTime::Clock(NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let end = RawTime::Clock(NaiveTime::from_hms_opt(22, 0, 0).unwrap());

        let event = store
            .add_event("Wedding", "Hall A", date, start, end, staff)
            .await
            .unwrap();
        store
            .add_event_booking(event, customer, date, 60)
            .await
            .unwrap();
        assert_eq!(store.bookings_for_event(event).await.unwrap().len(), 1);

        store.delete_event(event).await.unwrap();
        assert!(store.get_event(event).await.unwrap().is_none());
        assert!(store.bookings_for_event(event).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_lines_and_date_filter() {
        let store = MemoryStore::new();
        let staff = store.add_staff("A", "1", 1.0, "Admin").await.unwrap();
        let customer = store.add_customer("B", "2").await.unwrap();
        let when = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();

        let order = store.add_order(staff, customer, when).await.unwrap();
        store
            .add_order_line(OrderLine {
                order_id: order,
                menu_item_id: 99,
                quantity: 2,
                price: 5.5,
            })
            .await
            .unwrap();

        let day = when.date();
        assert_eq!(store.orders_between(day, day).await.unwrap().len(), 1);
        let next_day = day.succ_opt().unwrap();
        assert!(store
            .orders_between(next_day, next_day)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.lines_for_order(order).await.unwrap().len(), 1);
    }
}
