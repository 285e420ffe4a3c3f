use anyhow::Result;
use dynq_catalog::error::ErrorKind;
use dynq_catalog::{Catalog, ColumnAttributes, ColumnSpec, TableSpec};
use dynq_datatype::{ScalarType, Value};
use dynq_expr::{FilterItem, Operator};
use dynq_plan::{DeleteSpec, FetchSpec, RowKey, SortDirection, WriteSpec};
use dynq_server::error::Error;
use dynq_server::{ServerConfig, Service};
use serde_json::{Value as JsonValue, json};

const CONFIG: &str = r#"
[save]
create_batch_size = 5

[[engine.databases]]
name = "shop"

[[engine.databases.tables]]
name = "customers"
columns = [
    { name = "id", type = "int", primary_key = true, auto_increment = true },
    { name = "name", type = "str", max_len = 16 },
    { name = "dob", type = "date", nullable = true },
    { name = "status", type = "str", default = "new" },
    { name = "is_active", type = "bool", default = true },
    { name = "experience", type = "int", nullable = true },
    { name = "class_id", type = "int", nullable = true },
]

[[engine.databases.tables]]
name = "classes"
columns = [
    { name = "id", type = "int", primary_key = true, auto_increment = true },
    { name = "title", type = "str" },
]

[[engine.databases.tables]]
name = "events"
columns = [
    { name = "note", type = "str" },
]

[[engine.databases]]
name = "hr"

[[engine.databases.tables]]
name = "staff"
columns = [
    { name = "id", type = "int", primary_key = true, auto_increment = true },
    { name = "customer_id", type = "int" },
    { name = "role", type = "str" },
]
"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn service() -> Result<Service> {
    init_logger();
    let service = Service::from_config(ServerConfig::from_toml(CONFIG)?)?;
    call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "classes", "items": [
            {"title": "math"}, {"title": "art"}
        ]}),
    );
    call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "items": [
            {"name": "Ann", "dob": "1990-01-15", "experience": 5, "class_id": 1},
            {"name": "Bob", "experience": 2, "class_id": 2},
            {"name": "Cid", "experience": 7, "class_id": 1, "is_active": false},
            {"name": "Dee", "status": "vip"},
        ]}),
    );
    call(
        &service,
        "save",
        json!({"dbName": "hr", "tableName": "staff", "items": [
            {"customer_id": 1, "role": "lead"},
            {"customer_id": 3, "role": "dev"},
        ]}),
    );
    Ok(service)
}

fn call(service: &Service, op: &str, body: JsonValue) -> JsonValue {
    service.handle_json(op, &body.to_string())
}

fn error_kind(resp: &JsonValue) -> &str {
    resp["error"]["kind"].as_str().unwrap_or("")
}

#[test]
fn test_fetch_envelope() -> Result<()> {
    let service = service()?;
    let resp = call(
        &service,
        "fetch",
        json!({
            "dbName": "shop",
            "tableName": "customers",
            "fields": ["name", "id", "dob", "status", "is_active"],
            "sort": {"field": "id"},
            "pageSize": 2
        }),
    );
    assert_eq!(
        resp,
        json!({
            "data": [
                {"name": "Ann", "id": 1, "dob": "1990-01-15", "status": "new", "is_active": true},
                {"name": "Bob", "id": 2, "dob": null, "status": "new", "is_active": true},
            ],
            "message": "Fetch Success"
        })
    );
    // field order of each record follows the request.
    let first = resp["data"][0].as_object().unwrap();
    assert_eq!(
        first.keys().collect::<Vec<_>>(),
        vec!["name", "id", "dob", "status", "is_active"]
    );
    Ok(())
}

#[test]
fn test_fetch_left_fold_filters() -> Result<()> {
    let service = service()?;
    // experience > 4 OR name = 'Bob' AND is_active = true, folded left to right.
    let spec = FetchSpec::new("shop", "customers", &["name"])
        .filter(FilterItem::new(Operator::Gt, "experience", vec![Value::Int(4)]).or_next())
        .filter(FilterItem::new(Operator::Eq, "name", vec![Value::from("Bob")]))
        .filter(FilterItem::new(Operator::Eq, "is_active", vec![Value::Bool(true)]))
        .sort("name", SortDirection::Asc);
    let records = service.fetch(&spec)?;
    let names: Vec<&Value> = records.iter().map(|r| &r["name"]).collect();
    // Cid has experience 7 but is inactive.
    assert_eq!(names, vec![&Value::from("Ann"), &Value::from("Bob")]);

    let spec = FetchSpec::new("shop", "customers", &["name"]).filter(FilterItem::new(
        Operator::In,
        "id",
        vec![Value::Int(2), Value::Int(4), Value::Int(99)],
    ));
    assert_eq!(service.fetch(&spec)?.len(), 2);

    let spec = FetchSpec::new("shop", "customers", &["name"]).filter(FilterItem::new(
        Operator::Lt,
        "dob",
        vec![Value::from("2000-01-01")],
    ));
    assert_eq!(service.fetch(&spec)?.len(), 1);
    Ok(())
}

#[test]
fn test_fetch_join_across_databases() -> Result<()> {
    let service = service()?;
    let resp = call(
        &service,
        "fetch",
        json!({
            "dbName": "shop",
            "tableName": "customers",
            "fields": ["name", "classes.title", "hr.staff.role"],
            "joins": [
                {"leftRef": "customers.class_id", "rightRef": "classes.id"},
                {"leftRef": "customers.id", "rightRef": "staff.customer_id"}
            ],
            "sort": {"field": "name", "direction": "desc"}
        }),
    );
    assert_eq!(
        resp["data"],
        json!([
            {"name": "Cid", "classes.title": "math", "hr.staff.role": "dev"},
            {"name": "Ann", "classes.title": "math", "hr.staff.role": "lead"},
        ])
    );
    Ok(())
}

#[test]
fn test_fetch_errors() -> Result<()> {
    let service = service()?;
    let base = || json!({"dbName": "shop", "tableName": "customers", "fields": ["name"]});
    let cases = [
        (json!({"pageSize": 0}), "ValidationError"),
        (json!({"pageSize": 101}), "ValidationError"),
        (json!({"pageNumber": 0}), "ValidationError"),
        (json!({"limit": 5}), "ValidationError"),
        (json!({"fields": ["nope"]}), "SchemaError"),
        (json!({"tableName": "nope"}), "SchemaError"),
        (json!({"dbName": "nope"}), "SchemaError"),
        (
            json!({"filters": [{"operator": "eq", "field": "name", "values": ["a", "b"]}]}),
            "ValidationError",
        ),
        (
            json!({"filters": [{"operator": "eq", "field": "experience", "values": ["5"]}]}),
            "ValidationError",
        ),
        (
            json!({"joins": [{"leftRef": "staff.customer_id", "rightRef": "classes.id"}]}),
            "ValidationError",
        ),
        (
            json!({"joins": [{"leftRef": "customers", "rightRef": "classes.id"}]}),
            "ValidationError",
        ),
    ];
    for (patch, kind) in cases {
        let mut body = base();
        for (k, v) in patch.as_object().unwrap() {
            body[k] = v.clone();
        }
        let resp = call(&service, "fetch", body.clone());
        assert_eq!(error_kind(&resp), kind, "{} -> {}", body, resp);
    }
    let resp = call(
        &service,
        "fetch",
        json!({"dbName": "shop", "tableName": "customers", "fields": ["name"],
               "filters": [{"operator": "eq", "field": "experience", "values": ["5"]}]}),
    );
    assert_eq!(resp["error"]["field"], json!("experience"));
    assert_eq!(error_kind(&call(&service, "login", json!({}))), "ValidationError");
    Ok(())
}

#[test]
fn test_save_insert_and_defaults() -> Result<()> {
    let service = service()?;
    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "items": [
            {"name": "  Eve  ", "status": "", "is_active": false, "experience": 0},
        ]}),
    );
    assert_eq!(resp, json!({"data": [5], "message": "saved successfully"}));
    let records = service.fetch(
        &FetchSpec::new("shop", "customers", &["name", "status", "is_active", "experience"])
            .filter(FilterItem::new(Operator::Eq, "id", vec![Value::Int(5)])),
    )?;
    // empty string falls back to the default, false and zero are kept.
    assert_eq!(
        serde_json::to_value(&records)?,
        json!([{"name": "Eve", "status": "new", "is_active": false, "experience": 0}])
    );

    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "items": []}),
    );
    assert_eq!(resp["data"], json!([]));
    Ok(())
}

#[test]
fn test_save_update() -> Result<()> {
    let service = service()?;
    let mut item = serde_json::Map::new();
    item.insert("name".to_string(), json!("Bobby"));
    item.insert("experience".to_string(), json!(3));
    let keys = service.save(&WriteSpec::update("shop", "customers", Value::Int(2), item))?;
    assert_eq!(keys, vec![RowKey::from(Value::Int(2))]);
    let records = service.fetch(
        &FetchSpec::new("shop", "customers", &["name", "experience", "class_id"])
            .filter(FilterItem::new(Operator::Eq, "id", vec![Value::Int(2)])),
    )?;
    assert_eq!(records[0]["name"], Value::from("Bobby"));
    assert_eq!(records[0]["experience"], Value::Int(3));
    // fields not supplied are left alone.
    assert_eq!(records[0]["class_id"], Value::Int(2));

    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "recId": 2, "items": [{"name": "B"}]}),
    );
    assert_eq!(resp, json!({"data": [2], "message": "updated successfully"}));

    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "recId": 99, "items": [{"name": "X"}]}),
    );
    assert_eq!(error_kind(&resp), "NotFoundError");

    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "recId": 2,
               "items": [{"name": "X"}, {"name": "Y"}]}),
    );
    assert_eq!(error_kind(&resp), "ValidationError");
    assert_eq!(
        resp["error"]["message"],
        json!("only one record may be updated at a time")
    );

    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "customers", "recId": 99, "items": []}),
    );
    assert_eq!(error_kind(&resp), "ValidationError");
    assert_eq!(resp["error"]["message"], json!("a record is required for update"));
    Ok(())
}

#[test]
fn test_save_validation() -> Result<()> {
    let service = service()?;
    let cases = [
        (json!([{"name": "a", "ghost": 1}]), "ghost"),
        (json!([{"experience": 1}]), "name"),
        (json!([{"name": "a", "experience": "many"}]), "experience"),
        (json!([{"name": "a", "dob": "1990-13-01"}]), "dob"),
        (json!([{"name": "a very long name indeed"}]), "name"),
        (json!([{"name": "a"}, {"name": null}]), "name"),
    ];
    for (items, field) in cases {
        let resp = call(
            &service,
            "save",
            json!({"dbName": "shop", "tableName": "customers", "items": items}),
        );
        assert_eq!(error_kind(&resp), "WriteValidationError", "{}", resp);
        assert_eq!(resp["error"]["field"], json!(field));
    }
    // nothing was written by failed requests.
    let all = FetchSpec::new("shop", "customers", &["id"]).page(1, 100);
    assert_eq!(service.fetch(&all)?.len(), 4);
    Ok(())
}

#[test]
fn test_save_batch_limit() -> Result<()> {
    let service = service()?;
    let items: Vec<JsonValue> = (0..6).map(|i| json!({"title": format!("t{}", i)})).collect();
    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "classes", "items": items}),
    );
    assert_eq!(
        resp,
        json!({"error": {
            "kind": "ValidationError",
            "message": "Only 5 records allowed at a time.",
            "field": null
        }})
    );
    Ok(())
}

#[test]
fn test_save_rolls_back_failed_batch() -> Result<()> {
    let service = service()?;
    // a non-null column whose default is null: omitting it fails in the store.
    service
        .engine()
        .database("shop")
        .unwrap()
        .create_table(TableSpec::new(
            "badges",
            vec![
                ColumnSpec::new(
                    "id",
                    ScalarType::Int,
                    ColumnAttributes::PRIMARY_KEY | ColumnAttributes::AUTO_INCREMENT,
                ),
                ColumnSpec::new("label", ScalarType::Str, ColumnAttributes::empty())
                    .default(Value::Null),
            ],
        ))?;
    let resp = call(
        &service,
        "save",
        json!({"dbName": "shop", "tableName": "badges", "items": [{"label": "gold"}, {}]}),
    );
    assert_eq!(error_kind(&resp), "ExecutionError");
    assert_eq!(resp["error"]["field"], json!("label"));
    let records = service.fetch(&FetchSpec::new("shop", "badges", &["label"]))?;
    assert!(records.is_empty());
    Ok(())
}

#[test]
fn test_delete() -> Result<()> {
    let service = service()?;
    let resp = call(
        &service,
        "delete",
        json!({"dbName": "shop", "tableName": "customers",
               "filters": [{"operator": "eq", "field": "name", "values": ["nobody"]}]}),
    );
    assert_eq!(error_kind(&resp), "NotFoundError");

    let spec = DeleteSpec::new(
        "shop",
        "customers",
        vec![FilterItem::new(Operator::Eq, "class_id", vec![Value::Int(1)])],
    );
    let keys = service.delete(&spec)?;
    assert_eq!(
        keys,
        vec![RowKey::from(Value::Int(1)), RowKey::from(Value::Int(3))]
    );
    let err = service.delete(&spec).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let names: Vec<Value> = service
        .fetch(&FetchSpec::new("shop", "customers", &["name"]))?
        .into_iter()
        .map(|mut r| r.shift_remove("name").unwrap_or(Value::Null))
        .collect();
    assert_eq!(names, vec![Value::from("Bob"), Value::from("Dee")]);

    let resp = call(
        &service,
        "delete",
        json!({"dbName": "shop", "tableName": "customers", "filters": []}),
    );
    assert_eq!(resp, json!({"data": [2, 4], "message": "deleted successfully"}));

    // a table without primary key cannot be deleted from.
    let err = service
        .delete(&DeleteSpec::new("shop", "events", vec![]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(matches!(err, Error::Plan(_)));
    Ok(())
}

#[test]
fn test_live_schema() -> Result<()> {
    let service = service()?;
    let resp = call(
        &service,
        "fetch",
        json!({"dbName": "hr", "tableName": "teams", "fields": ["name"]}),
    );
    assert_eq!(error_kind(&resp), "SchemaError");
    service.engine().database("hr").unwrap().create_table(TableSpec::new(
        "teams",
        vec![
            ColumnSpec::new(
                "id",
                ScalarType::Int,
                ColumnAttributes::PRIMARY_KEY | ColumnAttributes::AUTO_INCREMENT,
            ),
            ColumnSpec::new("name", ScalarType::Str, ColumnAttributes::empty()),
        ],
    ))?;
    call(
        &service,
        "save",
        json!({"dbName": "hr", "tableName": "teams", "items": [{"name": "core"}]}),
    );
    let resp = call(
        &service,
        "fetch",
        json!({"dbName": "hr", "tableName": "teams", "fields": ["name"]}),
    );
    assert_eq!(resp["data"], json!([{"name": "core"}]));
    Ok(())
}
