//! Integration tests for parsing and re-rendering meta definitions.

use metaddl_core::MetaddlError;
use metaddl_schema::writer::to_meta;
use metaddl_schema::{parse, DataType, KeyKind, KeyType, SchemaModel};

const SHOP: &str = r"
-- a small shop schema
TABLE customer KEYTYPE INTEGER {
    COMMENT 'registered customers'
    COLUMN id INTEGER PRIMARY_KEY
    COLUMN email VARCHAR(200) MANDATORY
    COLUMN vip BOOLEAN DEFAULT(FALSE)
    KEY customer_email_key UNIQUE (email)
}

TABLE product {
    COLUMN sku CHAR(12) PRIMARY_KEY
    COLUMN price DECIMAL(10,2) MANDATORY
    COLUMN picture BLOB
    COLUMN notes CLOB COMMENT 'free text'
}

TABLE order_line KEYTYPE COMPOSITE {
    COLUMN order_id BIGINT PRIMARY_KEY
    COLUMN line_no SMALLINT PRIMARY_KEY
    COLUMN customer_id INTEGER MANDATORY FOREIGN_KEY(customer)
    COLUMN sku CHAR(12) FOREIGN_KEY(product.sku)
    COLUMN placed TIMESTAMP DEFAULT(CURRENT_TIMESTAMP)
    COLUMN amount DOUBLE
    QUERY_VIEW order_view
}

VIEW order_view FROM order_line {
    JOIN customer ON order_line.customer_id = customer.id
    JOIN product ON order_line.sku = product.sku
    COLUMN order_id = order_line.order_id
    COLUMN email = customer.email MANDATORY_FILTER
    COLUMN price = product.price
    COLUMN total = EXPR 'product.price * order_line.amount'
}
";

fn shop() -> SchemaModel {
    parse(SHOP).unwrap()
}

#[test]
fn test_shop_structure() {
    let schema = shop();
    assert_eq!(schema.table_names(), vec!["customer", "product", "order_line"]);

    let product = schema.table("product").unwrap();
    assert_eq!(product.key_type, KeyType::Natural);
    assert_eq!(
        product.get_column("sku").unwrap().data_type,
        DataType::Char { length: 12 }
    );

    let lines = schema.table("order_line").unwrap();
    assert_eq!(lines.key_type, KeyType::Composite);
    assert_eq!(
        lines.primary_key().unwrap().columns,
        vec!["order_id", "line_no"]
    );
    assert_eq!(lines.foreign_keys().count(), 2);
    assert_eq!(lines.referenced_tables(), vec!["customer", "product"]);
    assert!(lines.keys.iter().all(|k| k.name.is_none()));
    assert_eq!(lines.keys[0].kind, KeyKind::Primary);
}

#[test]
fn test_shop_roundtrip() {
    let schema = shop();
    let text = to_meta(&schema);
    assert_eq!(parse(&text).unwrap(), schema);
    // rendering is stable
    assert_eq!(to_meta(&parse(&text).unwrap()), text);
}

#[test]
fn test_shop_json_roundtrip() {
    let schema = shop();
    let json = serde_json::to_string_pretty(&schema).unwrap();
    let back: SchemaModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, schema);
}

#[test]
fn test_errors_carry_location() {
    let broken = SHOP.replace("COLUMN amount DOUBLE", "COLUMN amount FLOAT");
    let err = parse(&broken).unwrap_err();
    let MetaddlError::Parse(p) = err else {
        panic!("expected a parse error");
    };
    assert!(p.message.contains("FLOAT"));
    assert_eq!(
        p.line,
        SHOP.lines().position(|l| l.contains("amount")).unwrap() + 1
    );
}

#[test]
fn test_dangling_view_reference() {
    let broken = SHOP.replace("customer.email MANDATORY_FILTER", "customer.phone MANDATORY_FILTER");
    let err = parse(&broken).unwrap_err();
    assert_eq!(err.kind(), "unresolved_reference");
    assert!(err.to_string().contains("view order_view, column email"));
}
