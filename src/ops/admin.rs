//! Admin screens: event viewing and booking, reservations, table booking and
//! the order/payment flow.

use crate::error::{invalid_input, not_found, AppResult};
use crate::model::*;
use crate::ops::DateFilter;
use crate::session::{CartLine, OrderStage, Session};
use crate::store::Datastore;
use crate::utils::time::{normalize, to_display, to_storage, RawTime, TimeSlot};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One upcoming-events row, one per booking
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub event_id: Id,
    pub event_name: String,
    pub location: String,
    pub event_date: NaiveDate,
    /// "HH:MM - HH:MM", normalized from whatever the driver returned
    pub time_range: String,
    pub customer_name: String,
    pub guest_count: u32,
}

/// View upcoming events with their bookings
pub async fn upcoming_events(
    store: &dyn Datastore,
    filter: DateFilter,
) -> AppResult<Vec<EventView>> {
    let (start, end) = filter.range();
    let events = store.list_events_between(start, end).await?;

    let mut views = Vec::new();
    for event in events {
        let start_time = normalize(event.start_time.clone());
        let end_time = normalize(event.end_time.clone());
        let time_range = format!("{} - {}", to_display(start_time), to_display(end_time));

        for booking in store.bookings_for_event(event.id).await? {
            let Some(customer) = store.get_customer(booking.customer_id).await? else {
                continue;
            };
            views.push(EventView {
                event_id: event.id,
                event_name: event.name.clone(),
                location: event.location.clone(),
                event_date: event.event_date,
                time_range: time_range.clone(),
                customer_name: customer.name,
                guest_count: booking.guest_count,
            });
        }
    }
    Ok(views)
}

/// One reservation list row
#[derive(Debug, Clone, Serialize)]
pub struct ReservationRow {
    pub reservation_id: Id,
    pub customer_name: String,
    pub table_number: u32,
    pub reservation_date: NaiveDate,
    pub time_slot: String,
    pub guest_count: u32,
    pub status: ReservationStatus,
}

/// List reservations, optionally narrowed to a date or a range
pub async fn list_reservations(
    store: &dyn Datastore,
    filter: DateFilter,
) -> AppResult<Vec<ReservationRow>> {
    let range = match filter {
        DateFilter::All => None,
        other => Some(other.range()),
    };
    let reservations = store.list_reservations(range).await?;
    let tables = store.list_tables(None).await?;

    let mut rows = Vec::new();
    for reservation in reservations {
        let Some(customer) = store.get_customer(reservation.customer_id).await? else {
            continue;
        };
        let Some(table_number) = tables
            .iter()
            .find(|t| t.id == reservation.table_id)
            .map(|t| t.table_number)
        else {
            continue;
        };
        rows.push(ReservationRow {
            reservation_id: reservation.id,
            customer_name: customer.name,
            table_number,
            reservation_date: reservation.reservation_date,
            time_slot: reservation.time_slot,
            guest_count: reservation.guest_count,
            status: reservation.status,
        });
    }
    Ok(rows)
}

/// Editable reservation fields with the slot decoded for the time inputs
#[derive(Debug, Clone, Serialize)]
pub struct ReservationEditor {
    pub reservation_id: Id,
    pub reservation_date: NaiveDate,
    /// "HH:MM" pre-population for the start input
    pub start: String,
    /// "HH:MM" pre-population for the end input
    pub end: String,
    pub guest_count: u32,
    pub status: ReservationStatus,
}

/// Pre-populate the reservation editor. A malformed stored slot token comes
/// back as the 12:00-13:00 fallback pair.
pub async fn reservation_editor(store: &dyn Datastore, id: Id) -> AppResult<ReservationEditor> {
    let reservation = store
        .get_reservation(id)
        .await?
        .ok_or_else(|| not_found("reservation"))?;
    let slot = TimeSlot::decode(&reservation.time_slot);
    Ok(ReservationEditor {
        reservation_id: reservation.id,
        reservation_date: reservation.reservation_date,
        start: to_display(slot.start),
        end: to_display(slot.end),
        guest_count: reservation.guest_count,
        status: reservation.status,
    })
}

/// Update a reservation's date, slot and guest count. Cancelled reservations
/// cannot be updated further.
pub async fn update_reservation(
    store: &dyn Datastore,
    id: Id,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    guest_count: u32,
) -> AppResult<()> {
    let reservation = store
        .get_reservation(id)
        .await?
        .ok_or_else(|| not_found("reservation"))?;
    if reservation.status == ReservationStatus::Cancelled {
        return Err(invalid_input("reservation is cancelled"));
    }

    let slot = TimeSlot { start, end };
    store
        .update_reservation(id, date, &slot.encode(), guest_count)
        .await?;
    info!("Updated reservation {}", id);
    Ok(())
}

/// Cancel a reservation
pub async fn cancel_reservation(store: &dyn Datastore, id: Id) -> AppResult<()> {
    let reservation = store
        .get_reservation(id)
        .await?
        .ok_or_else(|| not_found("reservation"))?;
    if reservation.status == ReservationStatus::Cancelled {
        return Err(invalid_input("reservation is already cancelled"));
    }
    store
        .set_reservation_status(id, ReservationStatus::Cancelled)
        .await?;
    info!("Cancelled reservation {}", id);
    Ok(())
}

/// Tables currently open for reservation
pub async fn available_tables(store: &dyn Datastore) -> AppResult<Vec<DiningTable>> {
    store.list_tables(Some(TableStatus::Available)).await
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveTableInput {
    pub customer_name: String,
    pub phone: String,
    pub table_id: Id,
    pub reservation_date: NaiveDate,
    /// Slot token, normally one of the standard slots
    pub time_slot: String,
    pub guest_count: u32,
}

/// Create a customer and a reservation, and mark the table reserved
pub async fn reserve_table(store: &dyn Datastore, input: ReserveTableInput) -> AppResult<Id> {
    let customer_id = store
        .add_customer(&input.customer_name, &input.phone)
        .await?;
    let reservation_id = store
        .add_reservation(
            customer_id,
            input.table_id,
            input.reservation_date,
            &input.time_slot,
            input.guest_count,
        )
        .await?;
    store
        .set_table_status(input.table_id, TableStatus::Reserved)
        .await?;
    info!(
        "Reserved table {} for {} ({})",
        input.table_id, input.customer_name, input.time_slot
    );
    Ok(reservation_id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookEventInput {
    pub customer_name: String,
    pub phone: String,
    pub event_name: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub guest_count: u32,
}

/// Book a new event: customer, event and booking rows. Times are persisted
/// in the HH:MM:SS storage form.
pub async fn book_event(
    store: &dyn Datastore,
    input: BookEventInput,
    staff_id: Id,
    today: NaiveDate,
) -> AppResult<Id> {
    let customer_id = store
        .add_customer(&input.customer_name, &input.phone)
        .await?;
    let event_id = store
        .add_event(
            &input.event_name,
            &input.location,
            input.event_date,
            RawTime::Text(to_storage(input.start)),
            RawTime::Text(to_storage(input.end)),
            staff_id,
        )
        .await?;
    store
        .add_event_booking(event_id, customer_id, today, input.guest_count)
        .await?;
    info!("Booked event {} ({})", event_id, input.event_name);
    Ok(event_id)
}

/// Editable event fields with times normalized for the time inputs
#[derive(Debug, Clone, Serialize)]
pub struct EventEditor {
    pub event_id: Id,
    pub event_name: String,
    pub location: String,
    /// "HH:MM" pre-population for the start input
    pub start: String,
    /// "HH:MM" pre-population for the end input
    pub end: String,
}

/// Pre-populate the event editor
pub async fn event_editor(store: &dyn Datastore, id: Id) -> AppResult<EventEditor> {
    let event = store.get_event(id).await?.ok_or_else(|| not_found("event"))?;
    Ok(EventEditor {
        event_id: event.id,
        event_name: event.name,
        location: event.location,
        start: to_display(normalize(event.start_time)),
        end: to_display(normalize(event.end_time)),
    })
}

/// Update an event's name, location and times
pub async fn update_event(
    store: &dyn Datastore,
    id: Id,
    name: &str,
    location: &str,
    start: NaiveTime,
    end: NaiveTime,
) -> AppResult<()> {
    store
        .update_event(
            id,
            name,
            location,
            RawTime::Text(to_storage(start)),
            RawTime::Text(to_storage(end)),
        )
        .await?;
    info!("Updated event {}", id);
    Ok(())
}

/// Delete an event together with its bookings
pub async fn delete_event(store: &dyn Datastore, id: Id) -> AppResult<()> {
    store.delete_event(id).await?;
    info!("Deleted event {}", id);
    Ok(())
}

/// Menu items available for ordering within one category
pub async fn menu_for_category(store: &dyn Datastore, category_id: Id) -> AppResult<Vec<MenuItem>> {
    store.list_menu_items(Some(category_id), true).await
}

/// Apply a discount code to a total. An unknown code leaves the total
/// unchanged; code "0" or an empty code means no discount was requested.
pub async fn apply_discount(
    store: &dyn Datastore,
    code: &str,
    total: f64,
) -> AppResult<(f64, Option<Id>)> {
    let code = code.trim();
    if code.is_empty() || code == "0" {
        return Ok((total, None));
    }
    match store.find_discount(code).await? {
        Some(discount) => {
            let discounted = total * (1.0 - discount.percentage / 100.0);
            Ok((discounted, Some(discount.id)))
        }
        None => Ok((total, None)),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: Id,
    pub invoice_id: Id,
    pub total_amount: f64,
}

/// Confirm the cart in the session: insert customer, order, order lines and
/// invoice, then advance the session to the payment stage.
pub async fn confirm_order(
    store: &dyn Datastore,
    session: &mut Session,
    customer_name: &str,
    phone: &str,
    discount_code: &str,
    now: NaiveDateTime,
) -> AppResult<OrderConfirmation> {
    if session.stage == OrderStage::AwaitingPayment {
        return Err(invalid_input("an order is already awaiting payment"));
    }

    let (total, discount_id) = apply_discount(store, discount_code, session.cart_total()).await?;

    let customer_id = store.add_customer(customer_name, phone).await?;
    let order_id = store.add_order(session.user_id, customer_id, now).await?;
    for line in session.cart.values() {
        store
            .add_order_line(OrderLine {
                order_id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                price: line.unit_price,
            })
            .await?;
    }
    let invoice_id = store.add_invoice(order_id, total, discount_id, now).await?;

    session.stage = OrderStage::AwaitingPayment;
    session.order_id = Some(order_id);
    session.invoice_id = Some(invoice_id);
    session.total_amount = total;

    info!("Confirmed order {} (invoice {})", order_id, invoice_id);
    Ok(OrderConfirmation {
        order_id,
        invoice_id,
        total_amount: total,
    })
}

/// Cancel the order awaiting payment and reset the session flow
pub async fn cancel_order(store: &dyn Datastore, session: &mut Session) -> AppResult<()> {
    let order_id = session
        .order_id
        .ok_or_else(|| invalid_input("no order awaiting payment"))?;
    store
        .set_order_status(order_id, OrderStatus::Cancelled)
        .await?;
    session.reset_order_flow();
    info!("Cancelled order {}", order_id);
    Ok(())
}

/// Record payment for the invoice awaiting payment and reset the session
/// flow. Returns the paid invoice id so the invoice can be displayed.
pub async fn record_payment(
    store: &dyn Datastore,
    session: &mut Session,
    method: PaymentMethod,
    now: NaiveDateTime,
) -> AppResult<Id> {
    if session.stage != OrderStage::AwaitingPayment {
        return Err(invalid_input("no order awaiting payment"));
    }
    let invoice_id = session
        .invoice_id
        .ok_or_else(|| invalid_input("no invoice awaiting payment"))?;

    store
        .add_payment(invoice_id, session.total_amount, method, now)
        .await?;
    session.reset_order_flow();
    info!("Recorded {:?} payment for invoice {}", method, invoice_id);
    Ok(invoice_id)
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLineView {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub invoice_id: Id,
    pub order_id: Id,
    pub customer_name: String,
    /// Order timestamp formatted for display
    pub order_time: String,
    pub lines: Vec<InvoiceLineView>,
    pub total_amount: f64,
}

/// Assemble the printable invoice for a paid order
pub async fn invoice_view(store: &dyn Datastore, invoice_id: Id) -> AppResult<InvoiceView> {
    let invoice = store
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(|| not_found("invoice"))?;
    let order = store
        .get_order(invoice.order_id)
        .await?
        .ok_or_else(|| not_found("order"))?;
    let customer = store
        .get_customer(order.customer_id)
        .await?
        .ok_or_else(|| not_found("customer"))?;

    let mut lines = Vec::new();
    for line in store.lines_for_order(order.id).await? {
        let Some(item) = store.get_menu_item(line.menu_item_id).await? else {
            continue;
        };
        lines.push(InvoiceLineView {
            name: item.name,
            quantity: line.quantity,
            price: line.price,
            line_total: line.quantity as f64 * line.price,
        });
    }

    Ok(InvoiceView {
        invoice_id: invoice.id,
        order_id: order.id,
        customer_name: customer.name,
        order_time: order.order_time.format("%d-%m-%Y %H:%M").to_string(),
        lines,
        total_amount: invoice.total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeDelta;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn test_upcoming_events_normalizes_driver_shapes() {
        let store = MemoryStore::new();
        let staff = store.add_staff("A", "1", 1.0, "Admin").await.unwrap();
        let customer = store.add_customer("Kai", "2").await.unwrap();
        let day = date(2024, 6, 15);

        // The driver returned a duration for start and text for end
        let event = store
            .add_event(
                "Birthday",
                "Terrace",
                day,
                RawTime::Elapsed(TimeDelta::seconds(18 * 3600 + 30 * 60)),
                RawTime::Text("21:00:00".to_string()),
                staff,
            )
            .await
            .unwrap();
        store
            .add_event_booking(event, customer, day, 12)
            .await
            .unwrap();

        let views = upcoming_events(&store, DateFilter::On(day)).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].time_range, "18:30 - 21:00");
        assert_eq!(views[0].customer_name, "Kai");
    }

    #[tokio::test]
    async fn test_reservation_editor_falls_back_on_bad_slot() {
        let store = MemoryStore::new();
        let customer = store.add_customer("Mia", "1").await.unwrap();
        let table = store.add_table(1, 4).await.unwrap();
        let id = store
            .add_reservation(customer, table, date(2024, 6, 1), "not a slot", 2)
            .await
            .unwrap();

        let editor = reservation_editor(&store, id).await.unwrap();
        assert_eq!(editor.start, "12:00");
        assert_eq!(editor.end, "13:00");
    }

    #[tokio::test]
    async fn test_update_rejected_for_cancelled_reservation() {
        let store = MemoryStore::new();
        let customer = store.add_customer("Mia", "1").await.unwrap();
        let table = store.add_table(1, 4).await.unwrap();
        let id = store
            .add_reservation(customer, table, date(2024, 6, 1), "18:00-19:00", 2)
            .await
            .unwrap();

        cancel_reservation(&store, id).await.unwrap();
        let result =
            update_reservation(&store, id, date(2024, 6, 2), hm(19, 0), hm(20, 0), 3).await;
        assert!(result.is_err());
        // Cancelling twice is also rejected
        assert!(cancel_reservation(&store, id).await.is_err());
    }

    #[tokio::test]
    async fn test_reserve_table_marks_table_reserved() {
        let store = MemoryStore::new();
        let table = store.add_table(3, 2).await.unwrap();
        assert_eq!(available_tables(&store).await.unwrap().len(), 1);

        reserve_table(
            &store,
            ReserveTableInput {
                customer_name: "Noel".to_string(),
                phone: "555".to_string(),
                table_id: table,
                reservation_date: date(2024, 8, 1),
                time_slot: "13:00-14:00".to_string(),
                guest_count: 2,
            },
        )
        .await
        .unwrap();

        assert!(available_tables(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_flow_with_discount() {
        let store = MemoryStore::new();
        let category = store.add_menu_category("Mains").await.unwrap();
        let item = store.add_menu_item("Pasta", 10.0, category).await.unwrap();
        store.add_discount("SUMMER10", 10.0).await.unwrap();

        let mut session = Session::new(1, Role::Admin);
        session.set_cart_line(CartLine {
            menu_item_id: item,
            name: "Pasta".to_string(),
            quantity: 2,
            unit_price: 10.0,
        });

        let now = date(2024, 7, 1).and_hms_opt(12, 0, 0).unwrap();
        let confirmation = confirm_order(&store, &mut session, "Vera", "555", "SUMMER10", now)
            .await
            .unwrap();
        assert_eq!(confirmation.total_amount, 18.0);
        assert_eq!(session.stage, OrderStage::AwaitingPayment);

        // A second confirmation is rejected while payment is pending
        assert!(
            confirm_order(&store, &mut session, "Vera", "555", "0", now)
                .await
                .is_err()
        );

        let invoice_id = record_payment(&store, &mut session, PaymentMethod::Cash, now)
            .await
            .unwrap();
        assert_eq!(session.stage, OrderStage::Browsing);
        assert!(session.cart.is_empty());

        let invoice = invoice_view(&store, invoice_id).await.unwrap();
        assert_eq!(invoice.customer_name, "Vera");
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].line_total, 20.0);
        assert_eq!(invoice.total_amount, 18.0);
    }

    #[tokio::test]
    async fn test_cancel_order_resets_flow() {
        let store = MemoryStore::new();
        let category = store.add_menu_category("Mains").await.unwrap();
        let item = store.add_menu_item("Soup", 6.0, category).await.unwrap();

        let mut session = Session::new(1, Role::Admin);
        session.set_cart_line(CartLine {
            menu_item_id: item,
            name: "Soup".to_string(),
            quantity: 1,
            unit_price: 6.0,
        });

        let now = date(2024, 7, 2).and_hms_opt(18, 0, 0).unwrap();
        let confirmation = confirm_order(&store, &mut session, "Tom", "555", "0", now)
            .await
            .unwrap();
        cancel_order(&store, &mut session).await.unwrap();

        let order = store
            .get_order(confirmation.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(session.stage, OrderStage::Browsing);
    }

    #[tokio::test]
    async fn test_unknown_discount_leaves_total_unchanged() {
        let store = MemoryStore::new();
        let (total, id) = apply_discount(&store, "NOPE", 50.0).await.unwrap();
        assert_eq!(total, 50.0);
        assert_eq!(id, None);

        let (total, id) = apply_discount(&store, "0", 50.0).await.unwrap();
        assert_eq!(total, 50.0);
        assert_eq!(id, None);
    }
}
