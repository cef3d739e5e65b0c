// ==========================================
// Testdaten-Builder für Integrationstests
// ==========================================

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use stitch_admin::config::{StaticSettings, WorkshopSettings};
use stitch_admin::db::open_in_memory;
use stitch_admin::domain::clock::FixedClock;
use stitch_admin::domain::customer::Customer;
use stitch_admin::domain::machine::Machine;
use stitch_admin::domain::thread::Thread;
use stitch_admin::domain::types::{CustomerType, MachineStatus, MachineType};
use stitch_admin::domain::Article;
use stitch_admin::repository::{
    ArticleRepository, CustomerRepository, MachineRepository, ThreadRepository,
};

/// In-Memory-Datenbank mit Schema
pub fn test_conn() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_in_memory().unwrap()))
}

/// Feststehende Uhr: 10.03.2025 08:00 UTC
pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(test_datetime(2025, 3, 10, 8, 0)))
}

/// Standard-Einstellungen für Tests
pub fn default_settings() -> Arc<StaticSettings> {
    Arc::new(StaticSettings(WorkshopSettings::default()))
}

/// Einstellungen mit Anpassung
pub fn settings_with(adjust: impl FnOnce(&mut WorkshopSettings)) -> Arc<StaticSettings> {
    let mut settings = WorkshopSettings::default();
    adjust(&mut settings);
    Arc::new(StaticSettings(settings))
}

pub fn test_datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

// ==========================================
// Kunden-Builder
// ==========================================

pub struct CustomerBuilder {
    id: String,
    customer_type: CustomerType,
    company_name: Option<String>,
    last_name: Option<String>,
    city: Option<String>,
}

impl CustomerBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            customer_type: CustomerType::Business,
            company_name: Some("Müller GmbH".to_string()),
            last_name: None,
            city: Some("München".to_string()),
        }
    }

    pub fn private(mut self, last_name: &str) -> Self {
        self.customer_type = CustomerType::Private;
        self.company_name = None;
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn company(mut self, name: &str) -> Self {
        self.company_name = Some(name.to_string());
        self
    }

    pub fn insert(self, conn: &Arc<Mutex<Connection>>) -> Customer {
        let customer = Customer {
            id: self.id,
            customer_type: self.customer_type,
            company_name: self.company_name,
            first_name: None,
            last_name: self.last_name,
            street: Some("Hauptstraße 1".to_string()),
            postal_code: Some("80331".to_string()),
            city: self.city,
            country: Some("Deutschland".to_string()),
            email: Some("kunde@example.de".to_string()),
            phone: None,
            created_at: test_datetime(2025, 1, 1, 8, 0),
            updated_at: None,
        };
        CustomerRepository::from_connection(conn.clone())
            .insert(&customer)
            .unwrap();
        customer
    }
}

// ==========================================
// Artikel-Builder
// ==========================================

pub struct ArticleBuilder {
    id: String,
    name: String,
    stock: i64,
    min_stock: i64,
}

impl ArticleBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "T-Shirt Basic".to_string(),
            stock: 100,
            min_stock: 10,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn min_stock(mut self, min_stock: i64) -> Self {
        self.min_stock = min_stock;
        self
    }

    pub fn insert(self, conn: &Arc<Mutex<Connection>>) -> Article {
        let article = Article {
            id: self.id.clone(),
            code: self.id,
            name: self.name,
            category: Some("Shirts".to_string()),
            brand: None,
            stock: self.stock,
            min_stock: self.min_stock,
            purchase_price_single: Some(4.50),
            purchase_price_carton: None,
            purchase_price_ten_carton: None,
            recommended_price: Some(19.90),
            sell_price: Some(20.0),
            active: true,
            created_at: test_datetime(2025, 1, 1, 8, 0),
            updated_at: None,
        };
        ArticleRepository::from_connection(conn.clone())
            .insert(&article)
            .unwrap();
        article
    }
}

// ==========================================
// Maschinen-Builder
// ==========================================

pub struct MachineBuilder {
    id: String,
    name: String,
    machine_type: MachineType,
    status: MachineStatus,
}

impl MachineBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Maschine {}", id),
            machine_type: MachineType::Embroidery,
            status: MachineStatus::Active,
        }
    }

    pub fn machine_type(mut self, machine_type: MachineType) -> Self {
        self.machine_type = machine_type;
        self
    }

    pub fn status(mut self, status: MachineStatus) -> Self {
        self.status = status;
        self
    }

    pub fn insert(self, conn: &Arc<Mutex<Connection>>) -> Machine {
        let machine = Machine {
            id: self.id,
            name: self.name,
            machine_type: self.machine_type,
            manufacturer: Some("Tajima".to_string()),
            model: None,
            serial_number: None,
            num_heads: 6,
            needles_per_head: 15,
            max_speed: 1000,
            max_area_width_mm: Some(400),
            max_area_height_mm: Some(400),
            setup_time_minutes: 15,
            thread_change_time_minutes: 3,
            hoop_change_time_minutes: 5,
            status: self.status,
            maintenance_due: None,
            created_at: test_datetime(2025, 1, 1, 8, 0),
            created_by: None,
            updated_at: None,
            updated_by: None,
        };
        MachineRepository::from_connection(conn.clone())
            .insert(&machine)
            .unwrap();
        machine
    }
}

// ==========================================
// Garn-Builder
// ==========================================

pub struct ThreadBuilder {
    id: String,
    manufacturer: String,
    color_number: String,
    color_name: Option<String>,
    stock_m: f64,
    min_stock_m: f64,
}

impl ThreadBuilder {
    pub fn new(id: &str, color_number: &str) -> Self {
        Self {
            id: id.to_string(),
            manufacturer: "Madeira".to_string(),
            color_number: color_number.to_string(),
            color_name: None,
            stock_m: 1000.0,
            min_stock_m: 100.0,
        }
    }

    pub fn color_name(mut self, name: &str) -> Self {
        self.color_name = Some(name.to_string());
        self
    }

    pub fn stock(mut self, stock_m: f64) -> Self {
        self.stock_m = stock_m;
        self
    }

    pub fn min_stock(mut self, min_stock_m: f64) -> Self {
        self.min_stock_m = min_stock_m;
        self
    }

    pub fn insert(self, conn: &Arc<Mutex<Connection>>) -> Thread {
        let thread = Thread {
            id: self.id.clone(),
            manufacturer: self.manufacturer,
            color_number: self.color_number,
            color_name_de: self.color_name,
            color_name_en: None,
            hex_color: None,
            rgb_r: None,
            rgb_g: None,
            rgb_b: None,
            weight: 40,
            material: Some("Polyester".to_string()),
            price: 5.90,
            active: true,
            created_at: test_datetime(2025, 1, 1, 8, 0),
            updated_at: None,
        };
        let repo = ThreadRepository::from_connection(conn.clone());
        repo.insert(&thread).unwrap();
        repo.set_stock(&self.id, self.stock_m, self.min_stock_m, Some("Regal A"))
            .unwrap();
        thread
    }
}

// ==========================================
// DST-Bytes-Builder
// ==========================================

/// Baut eine DST-Datei aus 3-Byte-Records
pub fn build_dst(records: &[[u8; 3]], with_end_marker: bool) -> Vec<u8> {
    let mut data = Vec::with_capacity(512 + records.len() * 3 + 3);
    let mut header = vec![0x20u8; 512];
    header[..9].copy_from_slice(b"LA:MOTIV ");
    data.extend_from_slice(&header);
    for record in records {
        data.extend_from_slice(record);
    }
    if with_end_marker {
        data.extend_from_slice(&[0x00, 0x00, 0xF3]);
    }
    data
}

/// Bewegung +dx/+dy in 0.1-mm-Einheiten (ohne Skalierung)
pub fn dst_move(dx: u8, dy: u8) -> [u8; 3] {
    [dx & 0x7F, dy & 0x7F, 0x00]
}

/// Farbwechsel-Record
pub fn dst_color_change() -> [u8; 3] {
    [0xB0, 0xB0, 0xFE]
}
