use owo_colors::OwoColorize;

/// Fixed user-facing text. The listening audience reads Arabic, so these
/// are not localised.
pub mod msg {
    pub const LOAD_FAILED: &str =
        "حدث خطأ أثناء تحميل بيانات القرآن الكريم. يرجى التحقق من اتصال الإنترنت.";
    pub const STOPPED: &str = "تم إيقاف الصوت.";

    pub const PLAY: &str = "تشغيل";
    pub const STOP: &str = "إيقاف";
    pub const DOWNLOAD: &str = "تحميل";

    pub const PRAYER_TIMES: &str = "مواقيت الصلاة";

    pub fn verse_failed(ordinal: usize) -> String {
        format!("فشل في تحميل صوت الآية رقم {ordinal}")
    }

    pub fn now_playing(chapter: &str) -> String {
        format!("جاري تشغيل سورة {chapter}...")
    }

    pub fn download_started(chapter: &str) -> String {
        format!("بدأ تنزيل سورة {chapter} كملفات منفصلة.")
    }

    pub fn verse_count(n: usize) -> String {
        format!("({n} آية)")
    }
}

/// Where user-visible messages go.
pub trait Notifier {
    /// Something the user has to acknowledge.
    fn alert(&mut self, text: &str);
    /// Informational; never interrupts.
    fn toast(&mut self, text: &str);
    /// The persistent "now playing" line.
    fn show_banner(&mut self, text: &str);
    fn hide_banner(&mut self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&mut self, text: &str) {
        println!("{} {}", "!".red().bold(), text.bold());
    }

    fn toast(&mut self, text: &str) {
        eprintln!("{} {}", "·".yellow(), text.yellow());
    }

    fn show_banner(&mut self, text: &str) {
        println!("{} {}", "♪".green().bold(), text.green());
    }

    fn hide_banner(&mut self) {
        // a terminal line can't be taken back; just mark the end
        println!("{}", "—".dimmed());
    }
}
