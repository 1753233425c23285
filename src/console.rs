use alloc::fmt::format;
use core::fmt;
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Once;

/// 内核控制台输出
pub trait Console: Sync {
    fn write_str(&self, s: &str);
}

static CONSOLE: Once<&'static dyn Console> = Once::new();

/// 整行格式化后一次写出
pub fn print(args: fmt::Arguments) {
    // 控制台尚未注册时输出被丢弃
    if let Some(console) = CONSOLE.get() {
        console.write_str(&format(args));
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal) => {
        $crate::console::print(format_args!(concat!($fmt, "\n")))
    };
    ($fmt: literal, $($arg: tt)*) => {
        $crate::console::print(format_args!(concat!($fmt, "\n"), $($arg)*))
    };
}

/// 注册控制台并按编译期 `LOG` 环境变量设置日志级别
pub fn init(console: &'static dyn Console) {
    init_with_level(console, parse_level(option_env!("LOG")));
}

/// 注册控制台并设置日志级别
///
/// 控制台与日志器只会注册一次，之后的调用只更新级别。
pub fn init_with_level(console: &'static dyn Console, level: LevelFilter) {
    static LOGGER: Logger = Logger;
    static REGISTERED: Once<()> = Once::new();
    CONSOLE.call_once(|| console);
    REGISTERED.call_once(|| {
        // 其他日志器已注册时保留原有的
        let _ = log::set_logger(&LOGGER);
    });
    log::set_max_level(level);
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

struct Logger;
impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "\x1b[{}m[{:>5}] {}\x1b[0m",
            level_to_color_code(record.level()),
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn level_to_color_code(level: Level) -> u8 {
    match level {
        Level::Error => 31, // Red
        Level::Warn => 93,  // BrightYellow
        Level::Info => 34,  // Blue
        Level::Debug => 32, // Green
        Level::Trace => 90, // BrightBlack
    }
}
