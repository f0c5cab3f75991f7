use module_exceptions::{
    LogContext, LogLevel, SharedValue, Value, format, format_serialize, json_one_line,
};
use serde::Serialize;

#[derive(Serialize)]
struct Request<'a> {
    path: &'a str,
    retries: u8,
    headers: Vec<(&'a str, &'a str)>,
}

fn main() {
    println!("--- Diagnostic Formatting Example ---\n");

    let payload = Value::object([
        ("user", Value::from("ann")),
        ("roles", Value::set(["admin", "editor", "admin"])),
        ("session", Value::Undefined),
        ("limits", Value::object([("daily", 10), ("burst", 3)])),
    ]);

    println!("Default:  {}", format(&payload));
    println!("Compact:  {}", json_one_line(&payload, ""));

    let request = Request {
        path: "/books/42",
        retries: 2,
        headers: vec![("accept", "application/json")],
    };
    println!("Struct:   {}", format_serialize(&request, " "));

    // Scalars are not diagnostics
    println!("Scalar:   {:?}", format(&Value::from(42)));

    // A node that contains itself
    let node = SharedValue::new(Value::object([("name", "loop")]));
    let back = node.clone();
    node.update(|v| {
        if let Value::Object(fields) = v {
            fields.push(("self".into(), Value::Shared(back)));
        }
    });
    println!("Cycle:    {}", format(&Value::Shared(node.clone())));
    node.set(Value::Null);

    println!("\nLevels:");
    for level in LogLevel::ALL {
        println!("   {} = {}", level.as_u8(), level);
    }
    println!("Contexts: {} {}", LogContext::Terminal, LogContext::Browser);
}
