//! Manager screens: orders, staff, inventory, purchases, shifts, suppliers
//! and menu items.

use crate::error::{invalid_input, AppResult};
use crate::model::*;
use crate::ops::DateFilter;
use crate::store::Datastore;
use crate::utils::time::{normalize, to_display, to_storage, RawTime};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: Id,
    pub customer_name: String,
    /// Order timestamp formatted for display
    pub order_time: String,
    pub status: OrderStatus,
    pub total: f64,
    pub lines: Vec<OrderLineView>,
}

/// Orders with their line details and totals for a date or a range
pub async fn orders_between(
    store: &dyn Datastore,
    filter: DateFilter,
) -> AppResult<Vec<OrderSummary>> {
    let (start, end) = filter.range();
    let orders = store.orders_between(start, end).await?;

    let mut summaries = Vec::new();
    for order in orders {
        let Some(customer) = store.get_customer(order.customer_id).await? else {
            continue;
        };

        let mut lines = Vec::new();
        let mut total = 0.0;
        for line in store.lines_for_order(order.id).await? {
            let Some(item) = store.get_menu_item(line.menu_item_id).await? else {
                continue;
            };
            let line_total = line.quantity as f64 * line.price;
            total += line_total;
            lines.push(OrderLineView {
                name: item.name,
                quantity: line.quantity,
                price: line.price,
                line_total,
            });
        }

        summaries.push(OrderSummary {
            order_id: order.id,
            customer_name: customer.name,
            order_time: order.order_time.format("%d-%m-%Y %H:%M").to_string(),
            status: order.status,
            total,
            lines,
        });
    }
    Ok(summaries)
}

/// One upcoming-events row for the manager view, including who booked it
#[derive(Debug, Clone, Serialize)]
pub struct ManagerEventView {
    pub event_name: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub guest_count: u32,
    pub customer_name: String,
    pub booked_by: String,
}

/// Manager view of upcoming events
pub async fn upcoming_events(
    store: &dyn Datastore,
    filter: DateFilter,
) -> AppResult<Vec<ManagerEventView>> {
    let (start, end) = filter.range();
    let events = store.list_events_between(start, end).await?;

    let mut views = Vec::new();
    for event in events {
        let Some(booked_by) = store.get_staff(event.created_by_staff_id).await? else {
            continue;
        };
        for booking in store.bookings_for_event(event.id).await? {
            let Some(customer) = store.get_customer(booking.customer_id).await? else {
                continue;
            };
            views.push(ManagerEventView {
                event_name: event.name.clone(),
                location: event.location.clone(),
                event_date: event.event_date,
                guest_count: booking.guest_count,
                customer_name: customer.name,
                booked_by: booked_by.name.clone(),
            });
        }
    }
    Ok(views)
}

/// Search staff by name fragment and/or role name
pub async fn search_staff(
    store: &dyn Datastore,
    name: Option<&str>,
    role: Option<&str>,
) -> AppResult<Vec<Staff>> {
    store.list_staff(name, role).await
}

/// Role names currently assigned to staff, for the role picker
pub async fn staff_roles(store: &dyn Datastore) -> AppResult<Vec<String>> {
    store.list_role_names().await
}

/// Add a staff member; an unknown role name is created on the fly
pub async fn add_staff(
    store: &dyn Datastore,
    name: &str,
    phone: &str,
    salary: f64,
    role_name: &str,
) -> AppResult<Id> {
    let id = store.add_staff(name, phone, salary, role_name).await?;
    info!("Added staff {} ({})", name, role_name);
    Ok(id)
}

pub async fn update_staff(
    store: &dyn Datastore,
    id: Id,
    name: &str,
    phone: &str,
    salary: f64,
) -> AppResult<()> {
    store.update_staff(id, name, phone, salary).await?;
    info!("Updated staff {}", id);
    Ok(())
}

pub async fn delete_staff(store: &dyn Datastore, id: Id) -> AppResult<()> {
    store.delete_staff(id).await?;
    info!("Deleted staff {}", id);
    Ok(())
}

/// Inventory categories currently in use
pub async fn inventory_categories(store: &dyn Datastore) -> AppResult<Vec<String>> {
    store.inventory_categories().await
}

/// Inventory items within a category
pub async fn inventory_in_category(
    store: &dyn Datastore,
    category: &str,
) -> AppResult<Vec<InventoryItem>> {
    store.list_inventory(Some(category)).await
}

pub async fn add_inventory_item(
    store: &dyn Datastore,
    item_name: &str,
    unit: &str,
    quantity: f64,
    category: &str,
) -> AppResult<Id> {
    let id = store
        .add_inventory_item(item_name, unit, quantity, category)
        .await?;
    info!("Added inventory item {}", item_name);
    Ok(id)
}

pub async fn update_inventory_item(
    store: &dyn Datastore,
    id: Id,
    item_name: &str,
    unit: &str,
    quantity: f64,
) -> AppResult<()> {
    store
        .update_inventory_item(id, item_name, unit, quantity)
        .await?;
    info!("Updated inventory item {}", id);
    Ok(())
}

pub async fn delete_inventory_item(store: &dyn Datastore, id: Id) -> AppResult<()> {
    store.delete_inventory_item(id).await?;
    info!("Deleted inventory item {}", id);
    Ok(())
}

pub async fn list_suppliers(store: &dyn Datastore) -> AppResult<Vec<Supplier>> {
    store.list_suppliers().await
}

/// Add a supplier. Name and category are required fields on the form.
pub async fn add_supplier(
    store: &dyn Datastore,
    name: &str,
    phone: &str,
    category: &str,
) -> AppResult<Id> {
    if name.trim().is_empty() || category.trim().is_empty() {
        return Err(invalid_input("supplier name and category are required"));
    }
    let id = store.add_supplier(name, phone, category).await?;
    info!("Added supplier {}", name);
    Ok(id)
}

pub async fn update_supplier(
    store: &dyn Datastore,
    id: Id,
    name: &str,
    phone: &str,
    category: &str,
) -> AppResult<()> {
    store.update_supplier(id, name, phone, category).await?;
    info!("Updated supplier {}", id);
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseItemInput {
    pub item_id: Id,
    pub quantity: f64,
    pub price_per_unit: f64,
}

/// Record a purchase with its item lines. The total is computed from the
/// lines.
pub async fn record_purchase(
    store: &dyn Datastore,
    supplier_id: Id,
    staff_id: Id,
    purchase_date: NaiveDate,
    status: PurchaseStatus,
    items: Vec<PurchaseItemInput>,
) -> AppResult<(Id, f64)> {
    let total: f64 = items.iter().map(|i| i.quantity * i.price_per_unit).sum();

    let purchase_id = store
        .add_purchase(supplier_id, staff_id, purchase_date, status, total)
        .await?;
    for item in items {
        store
            .add_purchase_line(PurchaseLine {
                purchase_id,
                item_id: item.item_id,
                quantity: item.quantity,
                price_per_unit: item.price_per_unit,
            })
            .await?;
    }
    info!("Recorded purchase {} (total {:.2})", purchase_id, total);
    Ok((purchase_id, total))
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseLineView {
    pub item_name: String,
    pub quantity: f64,
    pub price_per_unit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseView {
    pub purchase_id: Id,
    pub supplier_name: String,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub total_amount: f64,
    pub lines: Vec<PurchaseLineView>,
}

/// Purchases within a date range, with supplier and line details
pub async fn purchases_between(
    store: &dyn Datastore,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<PurchaseView>> {
    let purchases = store.purchases_between(start, end).await?;
    let inventory = store.list_inventory(None).await?;

    let mut views = Vec::new();
    for purchase in purchases {
        let Some(supplier) = store.get_supplier(purchase.supplier_id).await? else {
            continue;
        };
        let lines = store
            .lines_for_purchase(purchase.id)
            .await?
            .into_iter()
            .filter_map(|line| {
                inventory
                    .iter()
                    .find(|i| i.id == line.item_id)
                    .map(|item| PurchaseLineView {
                        item_name: item.item_name.clone(),
                        quantity: line.quantity,
                        price_per_unit: line.price_per_unit,
                    })
            })
            .collect();
        views.push(PurchaseView {
            purchase_id: purchase.id,
            supplier_name: supplier.name,
            purchase_date: purchase.purchase_date,
            status: purchase.status,
            total_amount: purchase.total_amount,
            lines,
        });
    }
    Ok(views)
}

pub async fn update_purchase_status(
    store: &dyn Datastore,
    id: Id,
    status: PurchaseStatus,
) -> AppResult<()> {
    store.set_purchase_status(id, status).await?;
    info!("Purchase {} status set to {:?}", id, status);
    Ok(())
}

/// One shift row with times normalized for display. The same HH:MM strings
/// pre-populate the shift editor's time inputs.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftView {
    pub shift_id: Id,
    pub staff_name: String,
    pub role_name: String,
    pub shift_date: NaiveDate,
    pub start: String,
    pub end: String,
}

async fn shift_views(
    store: &dyn Datastore,
    shifts: Vec<Shift>,
    role_filter: Option<&str>,
) -> AppResult<Vec<ShiftView>> {
    let mut views = Vec::new();
    for shift in shifts {
        let Some(staff) = store.get_staff(shift.staff_id).await? else {
            continue;
        };
        if let Some(role) = role_filter {
            if staff.role_name != role {
                continue;
            }
        }
        views.push(ShiftView {
            shift_id: shift.id,
            staff_name: staff.name,
            role_name: staff.role_name,
            shift_date: shift.shift_date,
            start: to_display(normalize(shift.start_time)),
            end: to_display(normalize(shift.end_time)),
        });
    }
    Ok(views)
}

/// Shifts for a date or a range, optionally narrowed to a staff role
pub async fn shifts_between(
    store: &dyn Datastore,
    filter: DateFilter,
    role_filter: Option<&str>,
) -> AppResult<Vec<ShiftView>> {
    let (start, end) = filter.range();
    let shifts = store.shifts_between(start, end).await?;
    shift_views(store, shifts, role_filter).await
}

/// All shifts for one staff member
pub async fn shifts_for_staff(store: &dyn Datastore, staff_id: Id) -> AppResult<Vec<ShiftView>> {
    let shifts = store.shifts_for_staff(staff_id).await?;
    shift_views(store, shifts, None).await
}

/// Add a shift; times are persisted in the HH:MM:SS storage form
pub async fn add_shift(
    store: &dyn Datastore,
    staff_id: Id,
    shift_date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> AppResult<Id> {
    let id = store
        .add_shift(
            staff_id,
            shift_date,
            RawTime::Text(to_storage(start)),
            RawTime::Text(to_storage(end)),
        )
        .await?;
    info!("Added shift {} for staff {}", id, staff_id);
    Ok(id)
}

pub async fn update_shift(
    store: &dyn Datastore,
    id: Id,
    start: NaiveTime,
    end: NaiveTime,
) -> AppResult<()> {
    store
        .update_shift_times(
            id,
            RawTime::Text(to_storage(start)),
            RawTime::Text(to_storage(end)),
        )
        .await?;
    info!("Updated shift {}", id);
    Ok(())
}

pub async fn delete_shift(store: &dyn Datastore, id: Id) -> AppResult<()> {
    store.delete_shift(id).await?;
    info!("Deleted shift {}", id);
    Ok(())
}

/// All menu items, available or not
pub async fn list_menu_items(store: &dyn Datastore) -> AppResult<Vec<MenuItem>> {
    store.list_menu_items(None, false).await
}

/// Add a menu item to a category; new items start out available
pub async fn add_menu_item(
    store: &dyn Datastore,
    name: &str,
    price: f64,
    category_id: Id,
) -> AppResult<Id> {
    if name.trim().is_empty() {
        return Err(invalid_input("menu item name is required"));
    }
    let id = store.add_menu_item(name, price, category_id).await?;
    info!("Added menu item {}", name);
    Ok(id)
}

pub async fn update_menu_item(
    store: &dyn Datastore,
    id: Id,
    name: &str,
    price: f64,
    is_available: bool,
) -> AppResult<()> {
    store.update_menu_item(id, name, price, is_available).await?;
    info!("Updated menu item {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeDelta;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_order_summaries_total_lines() {
        let store = MemoryStore::new();
        let staff = store.add_staff("A", "1", 1.0, "Admin").await.unwrap();
        let customer = store.add_customer("Lena", "2").await.unwrap();
        let category = store.add_menu_category("Mains").await.unwrap();
        let pasta = store.add_menu_item("Pasta", 10.0, category).await.unwrap();
        let soup = store.add_menu_item("Soup", 4.0, category).await.unwrap();

        let when = date(2024, 7, 1).and_hms_opt(19, 15, 0).unwrap();
        let order = store.add_order(staff, customer, when).await.unwrap();
        for (item, quantity, price) in [(pasta, 2, 10.0), (soup, 1, 4.0)] {
            store
                .add_order_line(OrderLine {
                    order_id: order,
                    menu_item_id: item,
                    quantity,
                    price,
                })
                .await
                .unwrap();
        }

        let summaries = orders_between(&store, DateFilter::On(date(2024, 7, 1)))
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total, 24.0);
        assert_eq!(summaries[0].lines.len(), 2);
        assert_eq!(summaries[0].order_time, "01-07-2024 19:15");
    }

    #[tokio::test]
    async fn test_shift_views_normalize_and_filter_by_role() {
        let store = MemoryStore::new();
        let chef = store.add_staff("Pia", "1", 2000.0, "Chef").await.unwrap();
        let waiter = store
            .add_staff("Sam", "2", 1500.0, "Waiter")
            .await
            .unwrap();
        let day = date(2024, 7, 8);

        // Driver returned a duration for one shift and storage text for the other
        store
            .add_shift(
                chef,
                day,
                RawTime::Elapsed(TimeDelta::seconds(8 * 3600)),
                RawTime::Elapsed(TimeDelta::seconds(16 * 3600 + 30 * 60)),
            )
            .await
            .unwrap();
        store
            .add_shift(
                waiter,
                day,
                RawTime::Text("17:00:00".to_string()),
                RawTime::Text("23:00:00".to_string()),
            )
            .await
            .unwrap();

        let all = shifts_between(&store, DateFilter::On(day), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].start, "08:00");
        assert_eq!(all[0].end, "16:30");

        let chefs_only = shifts_between(&store, DateFilter::On(day), Some("Chef"))
            .await
            .unwrap();
        assert_eq!(chefs_only.len(), 1);
        assert_eq!(chefs_only[0].staff_name, "Pia");
    }

    #[tokio::test]
    async fn test_record_purchase_computes_total() {
        let store = MemoryStore::new();
        let supplier = store
            .add_supplier("FreshCo", "555", "Produce")
            .await
            .unwrap();
        let staff = store.add_staff("M", "1", 1.0, "Manager").await.unwrap();
        let tomatoes = store
            .add_inventory_item("Tomatoes", "kg", 5.0, "Produce")
            .await
            .unwrap();
        let basil = store
            .add_inventory_item("Basil", "bunch", 2.0, "Produce")
            .await
            .unwrap();

        let (purchase_id, total) = record_purchase(
            &store,
            supplier,
            staff,
            date(2024, 7, 10),
            PurchaseStatus::Ordered,
            vec![
                PurchaseItemInput {
                    item_id: tomatoes,
                    quantity: 10.0,
                    price_per_unit: 2.5,
                },
                PurchaseItemInput {
                    item_id: basil,
                    quantity: 4.0,
                    price_per_unit: 1.5,
                },
            ],
        )
        .await
        .unwrap();
        assert_eq!(total, 31.0);

        let views = purchases_between(&store, date(2024, 7, 1), date(2024, 7, 31))
            .await
            .unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].purchase_id, purchase_id);
        assert_eq!(views[0].supplier_name, "FreshCo");
        assert_eq!(views[0].lines.len(), 2);

        update_purchase_status(&store, purchase_id, PurchaseStatus::Received)
            .await
            .unwrap();
        let views = purchases_between(&store, date(2024, 7, 1), date(2024, 7, 31))
            .await
            .unwrap();
        assert_eq!(views[0].status, PurchaseStatus::Received);
    }

    #[tokio::test]
    async fn test_supplier_requires_name_and_category() {
        let store = MemoryStore::new();
        assert!(add_supplier(&store, "", "555", "Dairy").await.is_err());
        assert!(add_supplier(&store, "MilkCo", "555", "").await.is_err());
        assert!(add_supplier(&store, "MilkCo", "555", "Dairy").await.is_ok());
    }
}
