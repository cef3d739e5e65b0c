// ==========================================
// StitchAdmin - Domänenschicht
// ==========================================
// Entitäten und Typen; keine Datenbankzugriffe,
// keine Geschäftsvorgänge.
// ==========================================

pub mod article;
pub mod calendar;
pub mod clock;
pub mod customer;
pub mod design;
pub mod machine;
pub mod order;
pub mod shipping;
pub mod thread;
pub mod types;

pub use article::Article;
pub use calendar::{BlockSegment, ScheduleBlock};
pub use clock::{Clock, FixedClock, SystemClock};
pub use customer::Customer;
pub use design::{
    classify_design_file, is_dst_file, DesignFileKind, DesignThreadColor, OrderDesign,
    OrderItemPersonalization, POSITION_CHOICES,
};
pub use machine::{Machine, MaintenanceState};
pub use order::{Order, OrderItem, OrderStatusHistory};
pub use shipping::{DeliveryNote, PackingItem, PackingList, PostEntry, Shipment};
pub use thread::{hex_to_rgb, Thread, ThreadStock, ThreadUsage};
