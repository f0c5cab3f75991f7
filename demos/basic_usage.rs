use module_exceptions::{Category, Exception, LogLevel, Result, Subject, init, keys};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Account {
    email: String,
    age: u32,
}

fn validate(account: &Account) -> Result<()> {
    let exc = init("ACC", "Account Module");

    if !account.email.contains('@') {
        return Err(exc.create_invalid_atom(
            "VALIDATE",
            "Account has invalid fields.",
            Some(Subject::new(account.email.clone())),
            Some(keys(["email"])),
            None,
        ));
    }
    if account.age < 18 {
        return Err(exc.create_unauthorized("AGE", "Account holder is under age.", None));
    }
    Ok(())
}

fn describe(err: &Exception) {
    println!("   Type:      {}", err.name());
    println!("   Category:  {}", err.category());
    println!("   Message:   {}", err);
    if let Some(keys) = err.keys() {
        println!("   Keys:      {:?}", keys);
    }
    if let Some(email) = err.subject().and_then(|s| s.downcast_ref::<String>()) {
        println!("   Subject:   {}", email);
    }
}

fn main() {
    // RUST_LOG takes priority, otherwise debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::Debug.level_filter().to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    println!("--- Basic Usage Example ---\n");

    let accounts = [
        Account { email: "ann.example.com".into(), age: 30 },
        Account { email: "bob@example.com".into(), age: 12 },
        Account { email: "cat@example.com".into(), age: 40 },
    ];

    for (i, account) in accounts.iter().enumerate() {
        println!("{}. {:?}", i + 1, account);
        match validate(account) {
            Ok(()) => println!("   Valid.\n"),
            Err(err) => {
                describe(&err);

                // Dispatch on the category, never on message text
                let level = if err.is(Category::InvalidAtom) {
                    LogLevel::Warning
                } else {
                    LogLevel::Error
                };
                err.emit(level);

                println!("   Log line:  {}\n", err.log_view());
            }
        }
    }
}
