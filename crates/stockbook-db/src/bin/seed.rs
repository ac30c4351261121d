//! # Seed Data Generator
//!
//! Populates one tenant with demo suppliers, products, customers and orders.
//!
//! ## Usage
//! ```bash
//! # Seed the "demo" tenant in ./stockbook.db
//! cargo run -p stockbook-db --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p stockbook-db --bin seed -- --db ./data/stockbook.db --tenant acme
//! ```
//!
//! Prints the tenant's dashboard and sales report when done.

use std::env;
use stockbook_core::{
    CostBasis, CustomerInput, Money, NewSupplierPayment, OrderLineRequest, OrderRequest,
    ProductInput, SupplierInput, TenantId, Weight, DEFAULT_LOW_STOCK_THRESHOLD,
};
use stockbook_db::{Database, DbConfig};

/// Suppliers: (name, contact person, phone)
const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Guangzhou Trading Co.", "Li Wei", "+86-20-5555-0101"),
    ("Chittagong Imports", "Rahim Uddin", "+880-31-555-0102"),
    ("Dhaka Wholesale House", "Nusrat Jahan", "+880-2-555-0103"),
];

/// Products: (supplier index, sku, name, quantity, wholesale, import, weight, per-weight, domestic)
const PRODUCTS: &[(usize, &str, &str, i64, &str, &str, &str, &str, &str)] = &[
    (0, "BAG-001", "Leather Backpack", 40, "12.50", "60.00", "18.000", "3.20", "15.00"),
    (0, "BAG-002", "Canvas Tote", 120, "2.10", "35.00", "24.500", "3.20", "12.00"),
    (0, "WAL-001", "Slim Wallet", 8, "4.75", "10.00", "1.200", "3.20", "4.00"),
    (1, "TEA-001", "Assam Tea 500g", 300, "1.80", "42.00", "150.000", "0.90", "30.00"),
    (1, "SPC-001", "Cardamom 100g", 6, "3.40", "8.00", "0.600", "0.90", "2.50"),
    (2, "TEX-001", "Cotton Saree", 25, "18.00", "0", "9.000", "1.10", "20.00"),
    (2, "TEX-002", "Silk Scarf", 60, "6.25", "0", "3.000", "1.10", "9.00"),
];

/// Customers: (name, phone, address)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Karim Ahmed", "01711000001", "House 12, Road 4, Dhanmondi"),
    ("Farzana Akter", "01811000002", "Flat 3B, Gulshan 2"),
    ("Tanvir Hossain", "01911000003", ""),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockbook.db");
    let mut tenant = String::from("demo");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./stockbook.db)");
                println!("  -t, --tenant <ID>    Tenant to seed (default: demo)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let tenant_id = TenantId::new(&tenant)?;

    println!("🌱 Stockbook Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let shop = db.tenant(&tenant_id);

    let existing = shop.products().count().await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    // Suppliers
    let mut supplier_ids = Vec::new();
    for (name, contact, phone) in SUPPLIERS {
        let supplier = shop
            .suppliers()
            .insert(&SupplierInput {
                name: name.to_string(),
                contact_person: Some(contact.to_string()),
                phone: phone.to_string(),
                address: None,
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    // Products
    let mut products = Vec::new();
    for (supplier, sku, name, quantity, wholesale, import, weight, per_weight, domestic) in PRODUCTS {
        let input = ProductInput {
            sku: sku.to_string(),
            name: name.to_string(),
            supplier_id: supplier_ids.get(*supplier).cloned(),
            quantity: *quantity,
            wholesale_price_cents: Money::parse_decimal(wholesale, "wholesale_price")?.cents(),
            import_charge_cents: Money::parse_decimal(import, "import_charge")?.cents(),
            total_weight_milli: Weight::parse_decimal(weight, "total_weight")?.milli(),
            per_weight_cost_cents: Money::parse_decimal(per_weight, "per_weight_cost")?.cents(),
            domestic_charge_cents: Money::parse_decimal(domestic, "domestic_charge")?.cents(),
        };

        match shop.products().insert(&input).await {
            Ok(product) => {
                println!("  {} {:<20} unit cost {}", product.sku, product.name, product.unit_cost()?);
                products.push(product);
            }
            Err(e) => eprintln!("Failed to insert {}: {}", sku, e),
        }
    }
    println!("✓ {} products", products.len());

    // Customers
    let mut customers = Vec::new();
    for (name, phone, address) in CUSTOMERS {
        let customer = shop
            .customers()
            .insert(&CustomerInput {
                name: name.to_string(),
                phone: phone.to_string(),
                address: Some(address.to_string()),
            })
            .await?;
        customers.push(customer);
    }
    println!("✓ {} customers", customers.len());

    // A payment to the first supplier
    if let Some(first) = supplier_ids.first() {
        shop.suppliers()
            .record_payment(
                first,
                &NewSupplierPayment {
                    amount_cents: 50_000,
                    payment_date: None,
                    notes: Some("Advance".to_string()),
                },
            )
            .await?;
    }

    // Orders: each customer buys two units of a couple of products at a markup
    let mut placed = 0;
    for (n, customer) in customers.iter().enumerate() {
        let lines = products
            .iter()
            .skip(n)
            .step_by(3)
            .take(2)
            .map(|product| -> Result<OrderLineRequest, Box<dyn std::error::Error>> {
                let sale_price = product
                    .unit_cost()?
                    .multiply_ratio(3, 2)
                    .ok_or("markup price out of range")?;
                Ok(OrderLineRequest {
                    product_id: product.id.clone(),
                    quantity: 2,
                    sale_price_cents: sale_price.cents(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request = OrderRequest {
            customer_id: customer.id.clone(),
            delivery_charge_cents: 6_000,
            lines,
        };

        match shop.orders().create(&request).await {
            Ok(_) => placed += 1,
            Err(e) => eprintln!("Order for {} rejected: {}", customer.name, e),
        }
    }
    println!("✓ {} orders", placed);

    println!();
    let dashboard = shop.reports().dashboard(DEFAULT_LOW_STOCK_THRESHOLD).await?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    let report = shop.reports().sales_report(CostBasis::Snapshot).await?;
    println!();
    println!("Sales:  {}", Money::from_cents(report.total_sales_cents));
    println!("COGS:   {}", Money::from_cents(report.total_cogs_cents));
    println!("Profit: {}", Money::from_cents(report.profit_cents));

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
