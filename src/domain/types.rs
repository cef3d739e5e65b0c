// ==========================================
// StitchAdmin - Domänentypen
// ==========================================
// Statusfelder werden als lower_snake-Strings
// gespeichert (Abgleich: schema.sql)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Auftragsstatus (Order Status)
// ==========================================
// Regel: Wechsel nur über die Workflow-Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,      // Entwurf
    Accepted,   // Angenommen
    InProgress, // In Produktion
    Ready,      // Produktion abgeschlossen
    Completed,  // Abgeschlossen
    Cancelled,  // Storniert
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(OrderStatus::Draft),
            "accepted" => Some(OrderStatus::Accepted),
            "in_progress" => Some(OrderStatus::InProgress),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Endzustände erlauben keine weiteren Wechsel
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Deutsches Anzeige-Label
    pub fn label_de(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Entwurf",
            OrderStatus::Accepted => "Angenommen",
            OrderStatus::InProgress => "In Produktion",
            OrderStatus::Ready => "Versandbereit",
            OrderStatus::Completed => "Abgeschlossen",
            OrderStatus::Cancelled => "Storniert",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Auftragsart (Order Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Embroidery, // Stickerei
    Printing,   // Druck
    Dtf,        // DTF-Transfer
    Combined,   // Kombiniert
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Embroidery => "embroidery",
            OrderType::Printing => "printing",
            OrderType::Dtf => "dtf",
            OrderType::Combined => "combined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "embroidery" => Some(OrderType::Embroidery),
            "printing" => Some(OrderType::Printing),
            "dtf" => Some(OrderType::Dtf),
            "combined" => Some(OrderType::Combined),
            _ => None,
        }
    }

    /// Maschinentypen, die diese Auftragsart fertigen können
    pub fn compatible_machine_types(&self) -> Vec<MachineType> {
        match self {
            OrderType::Embroidery => vec![MachineType::Embroidery],
            OrderType::Printing | OrderType::Dtf => {
                vec![MachineType::Dtf, MachineType::Printing]
            }
            OrderType::Combined => {
                vec![MachineType::Embroidery, MachineType::Dtf, MachineType::Printing]
            }
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Design-Status (auftragsweit)
// ==========================================
// Abbildung des Design-Beschaffungswegs:
// vorhanden / vom Kunden / muss bestellt werden / ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignStatus {
    None,             // Kein Design
    CustomerProvided, // Vom Kunden bereitgestellt
    NeedsOrder,       // Muss beim Lieferanten bestellt werden
    Ordered,          // Bestellt
    Received,         // Erhalten
    Ready,            // Produktionsbereit
}

impl DesignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignStatus::None => "none",
            DesignStatus::CustomerProvided => "customer_provided",
            DesignStatus::NeedsOrder => "needs_order",
            DesignStatus::Ordered => "ordered",
            DesignStatus::Received => "received",
            DesignStatus::Ready => "ready",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(DesignStatus::None),
            "customer_provided" => Some(DesignStatus::CustomerProvided),
            "needs_order" => Some(DesignStatus::NeedsOrder),
            "ordered" => Some(DesignStatus::Ordered),
            "received" => Some(DesignStatus::Received),
            "ready" => Some(DesignStatus::Ready),
            _ => None,
        }
    }

    /// Produktionsbereit im Sinne des Design-Gates
    pub fn is_production_ready(&self) -> bool {
        matches!(self, DesignStatus::CustomerProvided | DesignStatus::Ready)
    }
}

impl fmt::Display for DesignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Design-Typ (pro Position)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignType {
    Stick, // Stickerei
    Druck, // Druck
    Flex,  // Flex/Flock
}

impl DesignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignType::Stick => "stick",
            DesignType::Druck => "druck",
            DesignType::Flex => "flex",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stick" => Some(DesignType::Stick),
            "druck" => Some(DesignType::Druck),
            "flex" => Some(DesignType::Flex),
            _ => None,
        }
    }

    pub fn label_de(&self) -> &'static str {
        match self {
            DesignType::Stick => "Stickerei",
            DesignType::Druck => "Druck",
            DesignType::Flex => "Flex/Flock",
        }
    }
}

impl fmt::Display for DesignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Freigabe-Status (pro Design-Position)
// ==========================================
// pending → sent → {approved, rejected, revision_requested}
// Ablehnung führt nach erneutem Upload zurück zu pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,           // Ausstehend
    Sent,              // Zur Freigabe gesendet
    Approved,          // Freigegeben
    Rejected,          // Abgelehnt
    RevisionRequested, // Änderung gewünscht
    Skipped,           // Freigabe nicht erforderlich
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Sent => "sent",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::RevisionRequested => "revision_requested",
            ApprovalStatus::Skipped => "skipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApprovalStatus::Pending),
            "sent" => Some(ApprovalStatus::Sent),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            "revision_requested" => Some(ApprovalStatus::RevisionRequested),
            "skipped" => Some(ApprovalStatus::Skipped),
            _ => None,
        }
    }

    /// Gibt die Position für die Produktion frei
    pub fn unlocks_production(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Skipped)
    }

    pub fn label_de(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Ausstehend",
            ApprovalStatus::Sent => "Zur Freigabe gesendet",
            ApprovalStatus::Approved => "Freigegeben",
            ApprovalStatus::Rejected => "Abgelehnt",
            ApprovalStatus::RevisionRequested => "Änderung gewünscht",
            ApprovalStatus::Skipped => "Keine Freigabe nötig",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Maschinentyp / Maschinenstatus
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineType {
    Embroidery, // Stickmaschine
    Printing,   // Druckmaschine
    Dtf,        // DTF-Drucker
}

impl MachineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::Embroidery => "embroidery",
            MachineType::Printing => "printing",
            MachineType::Dtf => "dtf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "embroidery" => Some(MachineType::Embroidery),
            "printing" => Some(MachineType::Printing),
            "dtf" => Some(MachineType::Dtf),
            _ => None,
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Active,      // Einsatzbereit
    Maintenance, // In Wartung
    Off,         // Außer Betrieb
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Active => "active",
            MachineStatus::Maintenance => "maintenance",
            MachineStatus::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(MachineStatus::Active),
            "maintenance" => Some(MachineStatus::Maintenance),
            "off" => Some(MachineStatus::Off),
            _ => None,
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Kalenderblock-Typ (Block Type)
// ==========================================
// Produktion, Büro, CRM und Personal teilen sich
// denselben Kalender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    // Produktion
    Pause,
    Maintenance,
    Production,
    // Büro
    Office,
    Meeting,
    Training,
    // CRM
    CallIn,
    CallOut,
    CustomerVisit,
    SiteVisit,
    Email,
    Quote,
    Complaint,
    // Personal
    Vacation,
    Sick,
    Other,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Pause => "pause",
            BlockType::Maintenance => "maintenance",
            BlockType::Production => "production",
            BlockType::Office => "office",
            BlockType::Meeting => "meeting",
            BlockType::Training => "training",
            BlockType::CallIn => "call_in",
            BlockType::CallOut => "call_out",
            BlockType::CustomerVisit => "customer_visit",
            BlockType::SiteVisit => "site_visit",
            BlockType::Email => "email",
            BlockType::Quote => "quote",
            BlockType::Complaint => "complaint",
            BlockType::Vacation => "vacation",
            BlockType::Sick => "sick",
            BlockType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pause" => Some(BlockType::Pause),
            "maintenance" => Some(BlockType::Maintenance),
            "production" => Some(BlockType::Production),
            "office" => Some(BlockType::Office),
            "meeting" => Some(BlockType::Meeting),
            "training" => Some(BlockType::Training),
            "call_in" => Some(BlockType::CallIn),
            "call_out" => Some(BlockType::CallOut),
            "customer_visit" => Some(BlockType::CustomerVisit),
            "site_visit" => Some(BlockType::SiteVisit),
            "email" => Some(BlockType::Email),
            "quote" => Some(BlockType::Quote),
            "complaint" => Some(BlockType::Complaint),
            "vacation" => Some(BlockType::Vacation),
            "sick" => Some(BlockType::Sick),
            "other" => Some(BlockType::Other),
            _ => None,
        }
    }

    /// CRM-Aktivität (kundengebunden, durchsuchbar)
    pub fn is_crm(&self) -> bool {
        matches!(
            self,
            BlockType::CallIn
                | BlockType::CallOut
                | BlockType::CustomerVisit
                | BlockType::SiteVisit
                | BlockType::Email
                | BlockType::Quote
                | BlockType::Complaint
        )
    }

    pub fn label_de(&self) -> &'static str {
        match self {
            BlockType::Pause => "Pause",
            BlockType::Maintenance => "Wartung",
            BlockType::Production => "Produktion",
            BlockType::Office => "Büroarbeit",
            BlockType::Meeting => "Meeting",
            BlockType::Training => "Schulung",
            BlockType::CallIn => "Anruf (eingehend)",
            BlockType::CallOut => "Anruf (ausgehend)",
            BlockType::CustomerVisit => "Kundenbesuch",
            BlockType::SiteVisit => "Außentermin",
            BlockType::Email => "E-Mail",
            BlockType::Quote => "Angebot",
            BlockType::Complaint => "Reklamation",
            BlockType::Vacation => "Urlaub",
            BlockType::Sick => "Krankheit",
            BlockType::Other => "Sonstiges",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Priorität
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Packlisten-Status
// ==========================================
// draft → ready → qc_passed → packed → shipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingListStatus {
    Draft,    // Entwurf
    Ready,    // Bereit zur Verpackung
    QcPassed, // QK bestanden
    Packed,   // Verpackt / Versandbereit
    Shipped,  // Versendet
}

impl PackingListStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackingListStatus::Draft => "draft",
            PackingListStatus::Ready => "ready",
            PackingListStatus::QcPassed => "qc_passed",
            PackingListStatus::Packed => "packed",
            PackingListStatus::Shipped => "shipped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PackingListStatus::Draft),
            "ready" => Some(PackingListStatus::Ready),
            "qc_passed" => Some(PackingListStatus::QcPassed),
            "packed" => Some(PackingListStatus::Packed),
            "shipped" => Some(PackingListStatus::Shipped),
            _ => None,
        }
    }

    pub fn label_de(&self) -> &'static str {
        match self {
            PackingListStatus::Draft => "Entwurf",
            PackingListStatus::Ready => "Bereit zur Verpackung",
            PackingListStatus::QcPassed => "QK bestanden",
            PackingListStatus::Packed => "Verpackt / Versandbereit",
            PackingListStatus::Shipped => "Versendet",
        }
    }
}

impl fmt::Display for PackingListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Lieferschein-Status / Lieferart
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryNoteStatus {
    Draft,     // Entwurf
    Ready,     // Bereit
    Sent,      // Versendet / übergeben
    Delivered, // Zugestellt / abgeholt
    Signed,    // Unterschrieben
}

impl DeliveryNoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryNoteStatus::Draft => "draft",
            DeliveryNoteStatus::Ready => "ready",
            DeliveryNoteStatus::Sent => "sent",
            DeliveryNoteStatus::Delivered => "delivered",
            DeliveryNoteStatus::Signed => "signed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DeliveryNoteStatus::Draft),
            "ready" => Some(DeliveryNoteStatus::Ready),
            "sent" => Some(DeliveryNoteStatus::Sent),
            "delivered" => Some(DeliveryNoteStatus::Delivered),
            "signed" => Some(DeliveryNoteStatus::Signed),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryNoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,   // Abholung durch den Kunden
    Shipping, // Versand
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Shipping => "shipping",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pickup" => Some(DeliveryMethod::Pickup),
            "shipping" => Some(DeliveryMethod::Shipping),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Postbuch (Richtung / Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostDirection {
    Incoming, // Eingehend
    Outgoing, // Ausgehend
}

impl PostDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostDirection::Incoming => "incoming",
            PostDirection::Outgoing => "outgoing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incoming" => Some(PostDirection::Incoming),
            "outgoing" => Some(PostDirection::Outgoing),
            _ => None,
        }
    }
}

impl fmt::Display for PostDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostEntryStatus {
    Draft,      // Entwurf (automatisch angelegt)
    InProgress, // In Bearbeitung
    Completed,  // Erledigt
    Archived,   // Archiviert
}

impl PostEntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostEntryStatus::Draft => "draft",
            PostEntryStatus::InProgress => "in_progress",
            PostEntryStatus::Completed => "completed",
            PostEntryStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostEntryStatus::Draft),
            "in_progress" => Some(PostEntryStatus::InProgress),
            "completed" => Some(PostEntryStatus::Completed),
            "archived" => Some(PostEntryStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for PostEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Versand-Status
// ==========================================
// created → shipped → delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Created,   // Angelegt
    Shipped,   // Versendet
    Delivered, // Zugestellt
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "created",
            ShipmentStatus::Shipped => "shipped",
            ShipmentStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(ShipmentStatus::Created),
            "shipped" => Some(ShipmentStatus::Shipped),
            "delivered" => Some(ShipmentStatus::Delivered),
            _ => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Garnverbrauchs-Typ
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    Production, // Produktion
    Test,       // Probestickerei
    Waste,      // Ausschuss
    Correction, // Bestandskorrektur
}

impl UsageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageType::Production => "production",
            UsageType::Test => "test",
            UsageType::Waste => "waste",
            UsageType::Correction => "correction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "production" => Some(UsageType::Production),
            "test" => Some(UsageType::Test),
            "waste" => Some(UsageType::Waste),
            "correction" => Some(UsageType::Correction),
            _ => None,
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Kundentyp
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Private,  // Privatkunde
    Business, // Geschäftskunde
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Private => "private",
            CustomerType::Business => "business",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(CustomerType::Private),
            "business" => Some(CustomerType::Business),
            _ => None,
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Lieferanten-Bestellstatus (pro Position)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierOrderStatus {
    None,      // Keine Bestellung nötig
    ToOrder,   // Zu bestellen
    Ordered,   // Bestellt
    Delivered, // Geliefert
}

impl SupplierOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierOrderStatus::None => "none",
            SupplierOrderStatus::ToOrder => "to_order",
            SupplierOrderStatus::Ordered => "ordered",
            SupplierOrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(SupplierOrderStatus::None),
            "to_order" => Some(SupplierOrderStatus::ToOrder),
            "ordered" => Some(SupplierOrderStatus::Ordered),
            "delivered" => Some(SupplierOrderStatus::Delivered),
            _ => None,
        }
    }
}

impl fmt::Display for SupplierOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_roundtrip() {
        for s in [
            OrderStatus::Draft,
            OrderStatus::Accepted,
            OrderStatus::InProgress,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("unbekannt"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_order_type_machine_compat() {
        assert_eq!(
            OrderType::Embroidery.compatible_machine_types(),
            vec![MachineType::Embroidery]
        );
        assert!(OrderType::Combined
            .compatible_machine_types()
            .contains(&MachineType::Dtf));
    }

    #[test]
    fn test_crm_block_types() {
        assert!(BlockType::CallIn.is_crm());
        assert!(BlockType::Complaint.is_crm());
        assert!(!BlockType::Production.is_crm());
        assert!(!BlockType::Vacation.is_crm());
    }

    #[test]
    fn test_approval_unlocks_production() {
        assert!(ApprovalStatus::Approved.unlocks_production());
        assert!(ApprovalStatus::Skipped.unlocks_production());
        assert!(!ApprovalStatus::Sent.unlocks_production());
    }
}
