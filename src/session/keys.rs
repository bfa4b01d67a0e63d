/// 会话槽位缓存键前缀
const SESSION_PREFIX: &str = "session:";

/// 生成会话槽位缓存键
pub fn session_slot_key(session_id: &str, slot: &str) -> String {
    format!("{}{}:{}", SESSION_PREFIX, session_id, slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_key_is_scoped_by_session() {
        assert_eq!(session_slot_key("abc", "user"), "session:abc:user");
        assert_ne!(session_slot_key("abc", "user"), session_slot_key("abd", "user"));
    }
}
