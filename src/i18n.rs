/// A language the prompt knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// How the language is named in the generation instruction.
    prompt_name: &'static str,
    /// Localised "add user authentication endpoint".
    example_subject: &'static str,
    example_body: [&'static str; 3],
}

const LANGUAGES: &[Language] = &[
    Language {
        code: "en",
        name: "English",
        native_name: "English",
        prompt_name: "English",
        example_subject: "add user authentication endpoint",
        example_body: [
            "Implement JWT-based authentication",
            "Add login and logout endpoints",
            "Include token validation middleware",
        ],
    },
    Language {
        code: "zh",
        name: "Chinese",
        native_name: "中文",
        prompt_name: "Chinese (Simplified)",
        example_subject: "添加用户认证接口",
        example_body: [
            "实现了用户认证的基本功能",
            "添加了登录和登出接口",
            "包含 JWT 令牌验证中间件",
        ],
    },
    Language {
        code: "ja",
        name: "Japanese",
        native_name: "日本語",
        prompt_name: "Japanese",
        example_subject: "ユーザー認証エンドポイントを追加",
        example_body: [
            "ユーザー認証機能を実装",
            "ログインとログアウトのエンドポイントを追加",
            "JWTトークン検証ミドルウェアを含む",
        ],
    },
    Language {
        code: "ko",
        name: "Korean",
        native_name: "한국어",
        prompt_name: "Korean",
        example_subject: "사용자 인증 엔드포인트 추가",
        example_body: [
            "사용자 인증 기능 구현",
            "로그인 및 로그아웃 엔드포인트 추가",
            "JWT 토큰 검증 미들웨어 포함",
        ],
    },
    Language {
        code: "de",
        name: "German",
        native_name: "Deutsch",
        prompt_name: "German",
        example_subject: "Benutzerauthentifizierungs-Endpoint hinzufügen",
        example_body: [
            "Benutzerauthentifizierung implementiert",
            "Login- und Logout-Endpunkte hinzugefügt",
            "JWT-Token-Validierungsmiddleware enthalten",
        ],
    },
    Language {
        code: "fr",
        name: "French",
        native_name: "Français",
        prompt_name: "French",
        example_subject: "ajouter l'endpoint d'authentification utilisateur",
        example_body: [
            "Implémentation de l'authentification utilisateur",
            "Ajout des endpoints de connexion et déconnexion",
            "Inclusion du middleware de validation JWT",
        ],
    },
    Language {
        code: "es",
        name: "Spanish",
        native_name: "Español",
        prompt_name: "Spanish",
        example_subject: "añadir endpoint de autenticación de usuario",
        example_body: [
            "Implementación de autenticación de usuario",
            "Añadidos endpoints de inicio y cierre de sesión",
            "Incluye middleware de validación JWT",
        ],
    },
    Language {
        code: "pt",
        name: "Portuguese",
        native_name: "Português",
        prompt_name: "Portuguese",
        example_subject: "adicionar endpoint de autenticação de usuário",
        example_body: [
            "Implementação de autenticação de usuário",
            "Adicionados endpoints de login e logout",
            "Inclui middleware de validação JWT",
        ],
    },
    Language {
        code: "ru",
        name: "Russian",
        native_name: "Русский",
        prompt_name: "Russian",
        example_subject: "добавить эндпоинт аутентификации пользователя",
        example_body: [
            "Реализована аутентификация пользователя",
            "Добавлены эндпоинты входа и выхода",
            "Включено промежуточное ПО для проверки JWT",
        ],
    },
    Language {
        code: "it",
        name: "Italian",
        native_name: "Italiano",
        prompt_name: "Italian",
        example_subject: "aggiungere endpoint di autenticazione utente",
        example_body: [
            "Implementazione dell'autenticazione utente",
            "Aggiunti endpoint di login e logout",
            "Include middleware di validazione JWT",
        ],
    },
];

pub fn lookup(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

fn english() -> &'static Language {
    &LANGUAGES[0]
}

/// English name for a code, or the raw code when unknown.
pub fn display_name(code: &str) -> &str {
    lookup(code).map(|l| l.name).unwrap_or(code)
}

/// Native name for a code, or the raw code when unknown.
pub fn native_name(code: &str) -> &str {
    lookup(code).map(|l| l.native_name).unwrap_or(code)
}

/// Map common spellings ("Japanese", "zh-CN", "pt-br") onto the codes above.
/// Unknown input comes back lowercased.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_lowercase();
    let normalized = match code.as_str() {
        "zh-cn" | "zh-hans" | "chinese" | "simplified chinese" => "zh",
        "japanese" | "jp" => "ja",
        "korean" | "kr" => "ko",
        "german" => "de",
        "french" => "fr",
        "spanish" => "es",
        "portuguese" | "pt-br" => "pt",
        "russian" => "ru",
        "italian" => "it",
        "english" | "en-us" | "en-gb" => "en",
        other => other,
    };
    normalized.to_string()
}

/// Language-specific pieces of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTemplate {
    pub instruction: String,
    pub example_subject: String,
    pub example_body: [&'static str; 3],
}

/// Build the instruction and worked example for `code`. Unknown codes keep their raw
/// code in the instruction and borrow the English example.
pub fn template(code: &str, commit_type: &str, scope: &str) -> LanguageTemplate {
    let (lang, instruction) = match lookup(code) {
        Some(lang) if lang.code == "en" => (
            lang,
            "Generate the commit message in English. Use professional technical terminology."
                .to_string(),
        ),
        Some(lang) => (
            lang,
            format!(
                "Generate the commit message in {}. Use professional technical {} terminology.",
                lang.prompt_name, lang.name
            ),
        ),
        None => (
            english(),
            format!(
                "Generate the commit message in {code}. Use professional technical terminology."
            ),
        ),
    };

    LanguageTemplate {
        instruction,
        example_subject: format!("{}{}", type_prefix(commit_type, scope), lang.example_subject),
        example_body: lang.example_body,
    }
}

fn type_prefix(commit_type: &str, scope: &str) -> String {
    if scope.is_empty() {
        format!("{commit_type}: ")
    } else {
        format!("{commit_type}({scope}): ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_fall_back_to_raw_code() {
        assert_eq!(display_name("ja"), "Japanese");
        assert_eq!(native_name("ja"), "日本語");
        assert_eq!(display_name("tlh"), "tlh");
        assert_eq!(native_name("tlh"), "tlh");
    }

    #[test]
    fn normalizes_common_spellings() {
        assert_eq!(normalize_code(" Japanese "), "ja");
        assert_eq!(normalize_code("zh-CN"), "zh");
        assert_eq!(normalize_code("en-GB"), "en");
        assert_eq!(normalize_code("fr"), "fr");
        assert_eq!(normalize_code("Klingon"), "klingon");
    }

    #[test]
    fn example_subject_carries_type_and_scope() {
        let t = template("en", "feat", "auth");
        assert_eq!(t.example_subject, "feat(auth): add user authentication endpoint");

        let t = template("de", "fix", "");
        assert!(t.example_subject.starts_with("fix: "));
        assert!(t.instruction.contains("German"));
    }

    #[test]
    fn unknown_code_keeps_code_in_instruction() {
        let t = template("eo", "docs", "");
        assert!(t.instruction.contains("in eo."));
        assert_eq!(t.example_subject, "docs: add user authentication endpoint");
    }
}
