//! Fixed reply texts.

/// `/start` greeting.
pub const START: &str = "<b>Приветствую!</b>\n\n\
Я бот чата мехмата МГУ (@mechmath) и имею кучу полезных функций. \
Узнать полный список доступных команд можно в /help.\n\n\
Обратная связь: <code>@rm_bk</code> 👋🏻";

/// `/help` command list.
pub const HELP: &str = "<b>Список доступных команд</b>:\n\n\
• /kek — кек пек\n\n\
• /kek_add — отправляет цитируемое сообщение (reply) в предложку для новых кеков\n\n\
Обратная связь: <code>@rm_bk</code>\n\
Код бота: <a href=\"https://github.com/uburuntu/algebrach\">uburuntu/algebrach</a>";

/// The kek base is empty.
pub const NO_KEKS: &str = "😔 No keks available at the moment. Please try again later!";

/// `/kek_add` without a reply.
pub const KEK_ADD_NO_REPLY: &str = "↪️ Кеки нужно предлагать реплаем на сообщение";

/// `/kek_add` outside the main chat.
pub const KEK_ADD_ELSEWHERE: &str = "➡️ Кеки можно предлагать только в @mechmath";

/// Caption of the surprise animation.
pub const SURPRISE_CAPTION: &str = "Предупреждал же, что кикну. Если не предупреждал, то";

/// Reply to an admin hit by the surprise.
pub const SURPRISE_SPARED: &str = "... Ho против хозяев не восстану.";

/// Placeholder of the read-only roll.
pub const SURPRISE_ROLL: &str = "/ROll";

/// Inline result title for a random kek.
pub const INLINE_RANDOM_TITLE: &str = "🎲 Случайный кек";

/// Inline result description for a random kek.
pub const INLINE_RANDOM_DESCRIPTION: &str = "Отправить случайный кек из базы";

/// Placeholder sent until the chosen random kek is filled in.
pub const INLINE_RANDOM_PLACEHOLDER: &str = "🎲 Выбираю кек...";

/// Inline result title when the search found nothing.
pub const INLINE_NOT_FOUND_TITLE: &str = "😢 Кеков не найдено";

/// Inline edit when there is no text kek at all.
pub const INLINE_EMPTY: &str = "😢 Кеков пока нет";

/// Title of an inline kek with no text to preview.
pub const INLINE_DEFAULT_TITLE: &str = "Кек";

/// Confirmation of a suggested kek; `link` is the `Кек` word, linked when possible.
pub fn kek_suggested(link: &str) -> String {
    format!("✅ {} отправлен в предложку", link)
}

/// Announcement of a read-only sentence.
pub fn surprise_sentence(mention: &str, minutes: i64) -> String {
    format!(
        "Эй, {}. Твой /kek обеспечил тебе {} мин. ридонли. Поздравляю!",
        mention, minutes
    )
}

/// Search description of the not-found inline result.
pub fn inline_not_found_description(query: &str) -> String {
    let short: String = query.chars().take(30).collect();
    format!("По запросу «{}»", short)
}

/// Message sent by the not-found inline result.
pub fn inline_not_found_message(query: &str) -> String {
    format!("🔍 Кеков по запросу «{}» не найдено", query)
}

/// `/kek_info` statistics, types listed most common first.
pub fn kek_info(total: usize, by_type: &[(String, usize)]) -> String {
    let mut text = format!("<b>Всего кеков в базе:</b> {}\n\n<b>По типу:</b>", total);
    for (kind, count) in by_type {
        text.push_str(&format!("\n• {}: {}", kind, count));
    }
    text
}
