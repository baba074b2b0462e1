// src/common/i18n.rs

use std::collections::HashMap;

// Tabela de traduções das mensagens de erro da API.
// Carregada uma vez no AppState; "en" é o idioma de fallback.
#[derive(Clone)]
pub struct I18nStore {
    translations: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

const FALLBACK_LANG: &str = "en";

// (chave, en, es, pt)
const MESSAGES: &[(&str, &str, &str, &str)] = &[
    (
        "error.validation",
        "One or more fields are invalid.",
        "Uno o más campos son inválidos.",
        "Um ou mais campos são inválidos.",
    ),
    (
        "error.email-exists",
        "This e-mail is already in use.",
        "Este correo ya está en uso.",
        "Este e-mail já está em uso.",
    ),
    (
        "error.slug-exists",
        "This studio address is already taken.",
        "Esta dirección de estudio ya está ocupada.",
        "Este endereço de estúdio já está em uso.",
    ),
    (
        "error.invalid-credentials",
        "Invalid e-mail or password.",
        "Correo o contraseña inválidos.",
        "E-mail ou senha inválidos.",
    ),
    (
        "error.invalid-token",
        "Missing or invalid authentication token.",
        "Token de autenticación ausente o inválido.",
        "Token de autenticação inválido ou ausente.",
    ),
    (
        "error.invalid-account",
        "This account is invalid. Please contact support.",
        "Esta cuenta es inválida. Contacta a soporte.",
        "Esta conta é inválida. Entre em contato com o suporte.",
    ),
    (
        "error.user-not-found",
        "User not found.",
        "Usuario no encontrado.",
        "Usuário não encontrado.",
    ),
    (
        "error.studio-not-found",
        "Studio not found.",
        "Estudio no encontrado.",
        "Estúdio não encontrado.",
    ),
    (
        "error.role-not-found",
        "Role not found.",
        "Rol no encontrado.",
        "Cargo não encontrado.",
    ),
    (
        "error.unknown-permission",
        "Unknown permission.",
        "Permiso desconocido.",
        "Permissão desconhecida.",
    ),
    (
        "error.invalid-permission",
        "The role references permissions outside the catalog.",
        "El rol referencia permisos fuera del catálogo.",
        "O cargo referencia permissões fora do catálogo.",
    ),
    (
        "error.protected-role",
        "The owner role cannot be deleted or renamed.",
        "El rol de propietario no puede eliminarse ni renombrarse.",
        "O cargo de dono não pode ser apagado nem renomeado.",
    ),
    (
        "error.no-membership",
        "You do not have access to this studio. Contact the studio owner.",
        "No tienes acceso a este estudio. Contacta al propietario.",
        "Você não tem acesso a este estúdio. Fale com o dono do estúdio.",
    ),
    (
        "error.storage-unavailable",
        "Service temporarily unavailable. Please try again.",
        "Servicio temporalmente no disponible. Intenta de nuevo.",
        "Serviço temporariamente indisponível. Tente novamente.",
    ),
    (
        "error.timeout",
        "The operation timed out. Please try again.",
        "La operación excedió el tiempo límite. Intenta de nuevo.",
        "A operação excedeu o tempo limite. Tente novamente.",
    ),
    (
        "error.forbidden",
        "You do not have the required permission for this action.",
        "No tienes el permiso necesario para esta acción.",
        "Você não tem a permissão necessária para esta ação.",
    ),
    (
        "error.internal",
        "An unexpected error occurred.",
        "Ocurrió un error inesperado.",
        "Ocorreu um erro inesperado.",
    ),
];

impl I18nStore {
    pub fn new() -> Self {
        let mut translations: HashMap<&'static str, HashMap<&'static str, &'static str>> =
            HashMap::new();
        for (key, en, es, pt) in MESSAGES {
            translations.entry("en").or_default().insert(key, en);
            translations.entry("es").or_default().insert(key, es);
            translations.entry("pt").or_default().insert(key, pt);
        }
        Self { translations }
    }

    /// Traduz a chave para o idioma pedido, caindo para "en" quando o
    /// idioma ou a chave não existem.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.translations
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.translations.get(FALLBACK_LANG).and_then(|m| m.get(key)))
            .copied()
            .unwrap_or(key)
            .to_string()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traduz_no_idioma_pedido() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("es", "error.no-membership"),
            "No tienes acceso a este estudio. Contacta al propietario."
        );
    }

    #[test]
    fn idioma_desconhecido_cai_para_ingles() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "error.internal"), "An unexpected error occurred.");
    }

    #[test]
    fn chave_desconhecida_retorna_a_propria_chave() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "error.nope"), "error.nope");
    }
}
