//! Emoticon allow-lists used by the punctuation and underscore passes.
//!
//! The punctuation pass protects these longest-first, so list order carries no
//! meaning here.

/// Text emoticons and kaomoji that survive punctuation stripping.
pub const PUNCTUATION_SAFE: &[&str] = &[
    "'s", "...", ":-)", ":)", ":-]", ":]", ":->", ":>", "8-)", "8)", ":-}", ":}", ":^)", "=]",
    "=)", ":-D", ":D", "8-D", "8D", "=D", "=3", "B^D", "c:", "C:", "x-D", "X-D", ":-))", ":))",
    ":-(", ":(", ":-c", ":c", ":-<", ":<", ":-[", ":[", ":-||", ":{", ":@", ";(", ":'-(", ":'(",
    ":=(", ":'-)", ":')", ">:(", ">:[", "D-':", "D:<", "D:", "D;", "D=", ":-O", ":O", ":-o",
    ":o", ":-0", ":0", "8-0", ">:O", "=O", "=o", "=0", ":-3", ":3", ">:3", ":-*", ":*", ":x",
    ";-)", ";)", "*-)", "*)", ";-]", ";]", ";^)", ";>", ":-,", ";D", ";3", ":-P", ":P", "X-P",
    "x-p", ":-p", ":p", ":-Þ", ":Þ", ":-þ", ":þ", ":-b", ":b", "d:", "=p", ">:P", ":-/", ":/",
    ":-.", ">:/", "=/", ":L", "=L", ":S", ":-|", ":|", ":$", "://)", "://3", ":-X", ":X", ":-#",
    ":#", ":-&", ":&", "O:-)", "O:)", "0:-3", "0:3", "0:-)", "0:)", "0;^)", ">:-)", ">:)",
    "}:-)", "}:)", "3:-)", "3:)", ">;-)", ">;)", ">;3", "|;-)", "|-O", "B-)", ":-J", "#-)",
    "%-)", "%)", ":-###..", ":###..", "<:-|", "',:-|", "',:-l", ":E", "8-X", "8=X", "x-3",
    "x=3", "~:>", "@};-", "@}->--", "@}-;-'---", "@>-->--", "8====D", "8===D", "8=D", "3=D",
    "8=>", "8===D~~~", "*<|:-)", "</3", "<\\3", "<3", "><>", "<><", "<*)))-{", "><(((*>",
    "\\o/", "*\\0/*", "o7", "v.v", "._.", "._.;", "X_X", "x_x", "+_+", "X_x", "x_X", "<_<",
    ">_>", "<.<", ">.>", "O_O", "o_o", "O-O", "o-o", "O_o", "o_O", ">.<", ">_<", "^5",
    "o/\\o", ">_>^ ^<_<", "V.v.V",
];

/// Underscore-bearing emoticons that must keep their underscore.
pub const UNDERSCORE_SAFE: &[&str] = &[
    "0_0", "(o)_(o)", "+_+", "+_-", "._.", "<o>_<o>", "<|>_<|>", "=_=", ">_<", "3_3", "6_9",
    ">_o", "@_@", "^_^", "o_o", "u_u", "x_x", "|_|", "||_||",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lists_have_no_duplicates() {
        let unique: HashSet<_> = UNDERSCORE_SAFE.iter().collect();
        assert_eq!(unique.len(), UNDERSCORE_SAFE.len());

        let unique: HashSet<_> = PUNCTUATION_SAFE.iter().collect();
        assert_eq!(unique.len(), PUNCTUATION_SAFE.len());
    }

    #[test]
    fn test_underscore_list_all_contain_underscore() {
        assert!(UNDERSCORE_SAFE.iter().all(|e| e.contains('_')));
    }
}
