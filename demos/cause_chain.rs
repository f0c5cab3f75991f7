use module_exceptions::{Category, ExceptionFactory, LogLevel, Result, exception, init};
use std::error::Error;
use std::io;
use tracing_subscriber::EnvFilter;

struct Store {
    exc: ExceptionFactory,
}

impl Store {
    fn read(&self, key: &str) -> Result<String> {
        let io_err = io::Error::new(io::ErrorKind::NotFound, format!("no file for '{}'", key));
        Err(exception!(self.exc, NotFound, "READ", caused_by: io_err, "Key {} is missing.", key))
    }
}

struct Auth {
    exc: ExceptionFactory,
    store: Store,
}

impl Auth {
    fn login(&self, user: &str) -> Result<()> {
        self.store.read(user).map_err(|e| {
            exception!(self.exc, AuthNotFound, "LOGIN", caused_by: e, "Unknown user {}.", user)
        })?;
        Ok(())
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::FunctionDebug.level_filter().to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    println!("--- Cause Chain Example ---\n");

    let auth = Auth {
        exc: init("AUTH", "Authentication"),
        store: Store {
            exc: init("KV", "Key-Value Store"),
        },
    };

    let Err(err) = auth.login("mallory") else {
        println!("Unexpected success");
        return;
    };

    println!("Composed message:\n   {}\n", err);

    println!("Chain:");
    for (depth, link) in err.chain().enumerate() {
        println!("   {}{}", "  ".repeat(depth), link);
    }

    println!("\nCapabilities:");
    for category in [Category::AuthNotFound, Category::NotFound, Category::General] {
        println!("   is {:<16} {}", category.to_string(), err.is(category));
    }

    if let Some(source) = err.source() {
        println!("\nDirect source: {}", source);
    }

    err.emit(LogLevel::Error);
}
