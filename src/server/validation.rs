//! Request payload validation for every entity.
//!
//! Creates check the full document and fill in defaults; updates check only
//! the fields they carry. Messages are the Turkish field messages the web
//! forms show.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};

use crate::database::Document;
use crate::models::{
    ActionItemStatus, BeneficiaryStatus, Currency, DonationStatus, MeetingStatus, MeetingType, PartnerStatus,
    PartnerType, PartnershipType, Priority, ScholarshipStatus, ScholarshipType, TaskStatus, UserRole,
};

static TC_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11}$").expect("valid TC number regex"));
static LOOSE_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s\-\+\(\)]{10,15}$").expect("valid phone regex"));
static MOBILE_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^5\d{9}$").expect("valid mobile regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid URL regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// Why a payload was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Field-level problems (`Doğrulama hatası`).
    Invalid(Vec<String>),
    /// Fields the record cannot be stored without (`Zorunlu alanlar eksik`).
    MissingFields(Vec<String>),
}

/// Validate `doc` for `entity`, filling create-time defaults in place.
pub fn validate(entity: &str, mode: Mode, doc: &mut Document) -> Result<(), Rejection> {
    let mut rules = Rules::new(doc, mode);
    match entity {
        "beneficiaries" => beneficiary(&mut rules),
        "donations" => donation(&mut rules),
        "tasks" => task(&mut rules),
        "todos" => todo(&mut rules),
        "users" => user(&mut rules),
        "meetings" => meeting(&mut rules),
        "messages" => message(&mut rules),
        "aid-applications" => aid_application(&mut rules),
        "partners" => partner(&mut rules),
        "scholarships" => scholarship(&mut rules),
        "meeting-decisions" => meeting_decision(&mut rules),
        "meeting-action-items" => meeting_action_item(&mut rules),
        "workflow-notifications" => workflow_notification(&mut rules),
        _ => {}
    }
    let outcome = rules.finish()?;

    if entity == "donations" && mode == Mode::Create {
        let missing: Vec<String> = [
            ("donation_type", "Bağış türü"),
            ("donation_purpose", "Bağış amacı"),
            ("receipt_number", "Makbuz numarası"),
        ]
        .into_iter()
        .filter(|(field, _)| text(doc, field).is_none_or(|v| v.trim().is_empty()))
        .map(|(_, label)| label.to_string())
        .collect();
        if !missing.is_empty() {
            return Err(Rejection::MissingFields(missing));
        }
    }

    for (field, value) in outcome.defaults {
        doc.entry(field).or_insert(value);
    }
    Ok(())
}

fn text<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// Collected outcome of running the rules.
struct Outcome {
    defaults: Vec<(String, Value)>,
}

/// Accumulates field errors the way a schema validator reports them: one
/// message per failing rule, in declaration order.
struct Rules<'a> {
    doc: &'a Document,
    mode: Mode,
    errors: Vec<String>,
    defaults: Vec<(String, Value)>,
}

impl<'a> Rules<'a> {
    fn new(doc: &'a Document, mode: Mode) -> Self {
        Self {
            doc,
            mode,
            errors: Vec::new(),
            defaults: Vec::new(),
        }
    }

    fn finish(self) -> Result<Outcome, Rejection> {
        if self.errors.is_empty() {
            Ok(Outcome {
                defaults: self.defaults,
            })
        } else {
            Err(Rejection::Invalid(self.errors))
        }
    }

    /// The field's value, treating `null` as absent.
    fn value(&self, field: &str) -> Option<&'a Value> {
        self.doc.get(field).filter(|v| !v.is_null())
    }

    /// True when a required field is absent on create, or explicitly
    /// nulled by either mode.
    fn missing_required(&self, field: &str, required: bool) -> bool {
        required && (self.mode == Mode::Create || self.doc.get(field).is_some_and(Value::is_null))
    }

    fn fail(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn default(&mut self, field: &str, value: Value) {
        if self.mode == Mode::Create {
            self.defaults.push((field.to_string(), value));
        }
    }

    /// String length bounds (in characters, after trimming).
    fn length(&mut self, field: &str, required: bool, min: (usize, &str), max: (usize, &str)) {
        match self.value(field) {
            None => {
                if self.missing_required(field, required) {
                    self.fail(min.1);
                }
            }
            Some(Value::String(s)) => {
                let len = s.trim().chars().count();
                if len < min.0 {
                    self.fail(min.1);
                } else if len > max.0 {
                    self.fail(max.1);
                }
            }
            Some(_) => self.fail(if min.1.is_empty() { max.1 } else { min.1 }),
        }
    }

    fn pattern(&mut self, field: &str, required: bool, check: impl Fn(&str) -> bool, message: &str) {
        match self.value(field) {
            None => {
                if self.missing_required(field, required) {
                    self.fail(message);
                }
            }
            // Optional fields may be sent as "" to clear them.
            Some(Value::String(s)) if s.is_empty() && !required => {}
            Some(Value::String(s)) => {
                if !check(s) {
                    self.fail(message);
                }
            }
            Some(_) => self.fail(message),
        }
    }

    fn one_of(&mut self, field: &str, required: bool, allowed: &[&str], message: &str) {
        match self.value(field) {
            None => {
                if self.missing_required(field, required) {
                    self.fail(message);
                }
            }
            Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
            Some(_) => self.fail(message),
        }
    }

    fn number(&mut self, field: &str, required: bool, check: impl Fn(f64) -> bool, message: &str) {
        match self.value(field) {
            None => {
                if self.missing_required(field, required) {
                    self.fail(message);
                }
            }
            Some(Value::Number(n)) if n.as_f64().is_some_and(&check) => {}
            Some(_) => self.fail(message),
        }
    }

    fn boolean(&mut self, field: &str, message: &str) {
        if let Some(value) = self.value(field)
            && !value.is_boolean()
        {
            self.fail(message);
        }
    }

    fn string_list(&mut self, field: &str, message: &str) {
        if let Some(value) = self.value(field) {
            let ok = value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !ok {
                self.fail(message);
            }
        }
    }

    fn date(&mut self, field: &str, required: bool, message: &str) {
        self.pattern(field, required, is_date, message);
    }
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
fn is_date(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
}

fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Turkish mobile number once every non-digit is stripped.
fn is_mobile_phone(value: &str) -> bool {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    MOBILE_PHONE.is_match(&digits)
}

fn beneficiary(r: &mut Rules) {
    r.length(
        "name",
        true,
        (2, "Ad Soyad en az 2 karakter olmalıdır"),
        (100, "Ad Soyad en fazla 100 karakter olmalıdır"),
    );
    r.pattern("tc_no", true, |v| TC_NO.is_match(v), "TC Kimlik No 11 haneli olmalıdır");
    r.pattern("phone", true, |v| LOOSE_PHONE.is_match(v), "Geçerli bir telefon numarası giriniz");
    r.length(
        "address",
        true,
        (10, "Adres en az 10 karakter olmalıdır"),
        (500, "Adres en fazla 500 karakter olmalıdır"),
    );
    r.pattern("email", false, is_email, "Geçerli bir email adresi giriniz");
    r.one_of("status", false, BeneficiaryStatus::VALUES, "Geçersiz durum değeri");
    r.number("family_size", false, |n| n >= 1.0, "Aile büyüklüğü en az 1 olmalıdır");
    r.default("status", json!(BeneficiaryStatus::default()));
    r.default("family_size", json!(1));
}

fn donation(r: &mut Rules) {
    r.length(
        "donor_name",
        true,
        (2, "Bağışçı adı en az 2 karakter olmalıdır"),
        (100, "Bağışçı adı en fazla 100 karakter olmalıdır"),
    );
    r.number("amount", true, |n| n > 0.0, "Bağış tutarı pozitif olmalıdır");
    r.one_of("currency", false, Currency::VALUES, "Geçersiz para birimi");
    r.pattern("donor_email", false, is_email, "Geçersiz e-posta");
    r.pattern(
        "donor_phone",
        false,
        is_mobile_phone,
        "Geçersiz telefon numarası (5XXXXXXXXX formatında olmalıdır)",
    );
    r.one_of("status", false, DonationStatus::VALUES, "Geçersiz bağış durumu");
    r.default("currency", json!(Currency::default()));
    r.default("status", json!(DonationStatus::default()));
    r.default("payment_method", json!("cash"));
}

fn task(r: &mut Rules) {
    r.length(
        "title",
        true,
        (3, "Görev başlığı en az 3 karakter olmalıdır"),
        (200, "Görev başlığı en fazla 200 karakter olmalıdır"),
    );
    r.length("description", false, (0, ""), (2000, "Açıklama en fazla 2000 karakter olmalıdır"));
    r.one_of("priority", false, Priority::VALUES, "Geçersiz öncelik");
    r.one_of("status", false, TaskStatus::VALUES, "Geçersiz durum");
    r.date("due_date", false, "Geçersiz bitiş tarihi formatı");
    r.string_list("tags", "Etiketler metin listesi olmalıdır");
    r.default("priority", json!(Priority::default()));
    r.default("status", json!(TaskStatus::default()));
}

fn todo(r: &mut Rules) {
    r.length(
        "title",
        true,
        (1, "Başlık zorunludur"),
        (100, "Başlık en fazla 100 karakter olmalıdır"),
    );
    r.one_of("priority", false, Priority::VALUES, "Geçersiz öncelik");
    r.boolean("completed", "Tamamlanma durumu true/false olmalıdır");
    r.date("due_date", false, "Geçersiz bitiş tarihi formatı");
    r.default("priority", json!(Priority::default()));
    r.default("completed", json!(false));
}

fn user(r: &mut Rules) {
    r.length(
        "name",
        true,
        (2, "İsim en az 2 karakter olmalıdır"),
        (100, "İsim en fazla 100 karakter olabilir"),
    );
    r.pattern("email", true, is_email, "Geçerli bir email adresi giriniz");
    r.length("email", false, (0, ""), (255, "Email en fazla 255 karakter olabilir"));
    r.one_of("role", false, UserRole::VALUES, "Geçersiz kullanıcı rolü");
    r.string_list("permissions", "Geçersiz yetki listesi");
    r.pattern("phone", false, is_mobile_phone, "Geçersiz telefon numarası");
    r.boolean("is_active", "Aktiflik durumu true/false olmalıdır");
    r.default("role", json!(UserRole::default()));
    r.default("is_active", json!(true));
}

fn meeting(r: &mut Rules) {
    r.length(
        "title",
        true,
        (3, "Toplantı başlığı en az 3 karakter olmalıdır"),
        (200, "Toplantı başlığı en fazla 200 karakter olmalıdır"),
    );
    r.length("meeting_date", true, (1, "Toplantı tarihi zorunludur"), (100, "Toplantı tarihi zorunludur"));
    r.length("description", false, (0, ""), (2000, "Açıklama en fazla 2000 karakter olmalıdır"));
    r.length("location", false, (0, ""), (200, "Konum en fazla 200 karakter olmalıdır"));
    r.string_list("participants", "Katılımcılar metin listesi olmalıdır");
    r.one_of("status", false, MeetingStatus::VALUES, "Geçersiz durum");
    r.one_of("meeting_type", false, MeetingType::VALUES, "Geçersiz toplantı türü");
    r.length("agenda", false, (0, ""), (2000, "Gündem en fazla 2000 karakter olmalıdır"));
    r.length("notes", false, (0, ""), (2000, "Notlar en fazla 2000 karakter olmalıdır"));
    r.default("participants", json!([]));
    r.default("status", json!(MeetingStatus::default()));
    r.default("meeting_type", json!(MeetingType::default()));
}

fn message(r: &mut Rules) {
    r.one_of(
        "message_type",
        true,
        &["sms", "email", "internal"],
        "Geçersiz mesaj türü",
    );
    r.length("sender", true, (1, "Gönderici zorunludur"), (200, "Gönderici en fazla 200 karakter olmalıdır"));
    r.string_list("recipients", "Alıcılar metin listesi olmalıdır");
    r.length("content", true, (1, "Mesaj içeriği zorunludur"), (5000, "Mesaj en fazla 5000 karakter olmalıdır"));
    r.one_of("status", false, &["draft", "sent", "failed"], "Geçersiz durum");
    r.boolean("is_read", "Okundu durumu true/false olmalıdır");
    r.default("status", json!("draft"));
    r.default("is_read", json!(false));
    r.default("recipients", json!([]));
}

fn aid_application(r: &mut Rules) {
    r.length(
        "applicant_name",
        true,
        (2, "Başvuran adı en az 2 karakter olmalıdır"),
        (200, "Başvuran adı en fazla 200 karakter olmalıdır"),
    );
    r.one_of("applicant_type", false, &["person", "organization"], "Geçersiz başvuran türü");
    r.date("application_date", true, "Geçersiz başvuru tarihi");
    r.one_of(
        "stage",
        false,
        &["draft", "under_review", "approved", "ongoing", "completed"],
        "Geçersiz aşama",
    );
    r.one_of("status", false, &["open", "closed"], "Geçersiz durum");
    r.number("one_time_aid", false, |n| n >= 0.0, "Yardım tutarı negatif olamaz");
    r.default("applicant_type", json!("person"));
    r.default("stage", json!("draft"));
    r.default("status", json!("open"));
}

fn partner(r: &mut Rules) {
    r.length(
        "name",
        true,
        (2, "İsim en az 2 karakter olmalıdır"),
        (200, "İsim en fazla 200 karakter olabilir"),
    );
    r.one_of("type", true, PartnerType::VALUES, "Geçersiz ortak tipi");
    r.one_of("partnership_type", true, PartnershipType::VALUES, "Geçersiz ortaklık tipi");
    r.one_of("status", false, PartnerStatus::VALUES, "Geçersiz durum");
    r.length(
        "contact_person",
        false,
        (2, "İletişim kişisi adı en az 2 karakter olmalıdır"),
        (100, "İletişim kişisi adı en fazla 100 karakter olabilir"),
    );
    r.pattern("email", false, is_email, "Geçerli bir email adresi giriniz");
    r.pattern("phone", false, is_mobile_phone, "Geçersiz telefon numarası");
    r.length(
        "address",
        false,
        (10, "Adres en az 10 karakter olmalıdır"),
        (500, "Adres en fazla 500 karakter olabilir"),
    );
    r.pattern("website", false, |v| URL.is_match(v), "Geçerli bir web sitesi URL'i giriniz");
    r.date("collaboration_start_date", false, "Geçersiz işbirliği başlangıç tarihi formatı");
    r.date("collaboration_end_date", false, "Geçersiz işbirliği bitiş tarihi formatı");
    if let (Some(start), Some(end)) = (
        r.value("collaboration_start_date").and_then(Value::as_str),
        r.value("collaboration_end_date").and_then(Value::as_str),
    ) && is_date(start)
        && is_date(end)
        && start > end
    {
        r.fail("İşbirliği başlangıç tarihi bitiş tarihinden önce olmalıdır");
    }
    r.default("status", json!(PartnerStatus::default()));
}

fn scholarship(r: &mut Rules) {
    r.length(
        "student_name",
        true,
        (2, "Ad Soyad en az 2 karakter olmalıdır"),
        (100, "Ad Soyad en fazla 100 karakter olmalıdır"),
    );
    r.pattern("tc_no", true, |v| TC_NO.is_match(v), "TC Kimlik No 11 haneli olmalıdır");
    r.length(
        "school_name",
        true,
        (2, "Okul adı en az 2 karakter olmalıdır"),
        (200, "Okul adı en fazla 200 karakter olabilir"),
    );
    r.number(
        "grade",
        true,
        |n| n.fract() == 0.0 && (1.0..=12.0).contains(&n),
        "Sınıf 1 ile 12 arasında bir tam sayı olmalıdır",
    );
    r.number(
        "scholarship_amount",
        true,
        |n| n > 0.0 && n <= 999_999_999.0,
        "Burs tutarı pozitif olmalıdır",
    );
    r.one_of("scholarship_type", true, ScholarshipType::VALUES, "Geçersiz burs tipi");
    r.date("start_date", false, "Geçersiz başlangıç tarihi formatı");
    r.date("end_date", false, "Geçersiz bitiş tarihi formatı");
    r.one_of("status", false, ScholarshipStatus::VALUES, "Geçersiz burs durumu");
    r.default("status", json!(ScholarshipStatus::default()));
}

fn meeting_decision(r: &mut Rules) {
    r.length("meeting_id", true, (1, "Toplantı seçilmelidir"), (100, "Geçersiz toplantı"));
    r.length(
        "title",
        true,
        (3, "Karar başlığı en az 3 karakter olmalıdır"),
        (200, "Karar başlığı en fazla 200 karakter olmalıdır"),
    );
    r.length("summary", false, (0, ""), (2000, "Özet en fazla 2000 karakter olmalıdır"));
}

fn meeting_action_item(r: &mut Rules) {
    r.length("meeting_id", true, (1, "Toplantı seçilmelidir"), (100, "Geçersiz toplantı"));
    r.length(
        "title",
        true,
        (3, "Görev başlığı en az 3 karakter olmalıdır"),
        (200, "Görev başlığı en fazla 200 karakter olmalıdır"),
    );
    r.length("assigned_to", true, (1, "Sorumlu kişi seçilmelidir"), (100, "Geçersiz sorumlu"));
    r.one_of("status", false, ActionItemStatus::VALUES, "Geçersiz durum");
    r.date("due_date", false, "Geçersiz bitiş tarihi formatı");
    r.default("status", json!(ActionItemStatus::default()));
}

fn workflow_notification(r: &mut Rules) {
    r.length("recipient", true, (1, "Alıcı zorunludur"), (100, "Geçersiz alıcı"));
    r.one_of("category", true, &["meeting", "gorev", "rapor"], "Geçersiz bildirim kategorisi");
    r.length("title", true, (1, "Başlık zorunludur"), (200, "Başlık en fazla 200 karakter olmalıdır"));
    r.one_of("status", false, &["beklemede", "gonderildi", "okundu"], "Geçersiz durum");
    r.default("status", json!("beklemede"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn valid_beneficiary() -> Document {
        doc(json!({
            "name": "Ayşe Yılmaz",
            "tc_no": "12345678901",
            "phone": "0532 123 45 67",
            "address": "Atatürk Cad. No:1 Kadıköy",
        }))
    }

    #[test]
    fn test_beneficiary_defaults() {
        let mut beneficiary = valid_beneficiary();
        validate("beneficiaries", Mode::Create, &mut beneficiary).unwrap();
        assert_eq!(beneficiary["status"], "TASLAK");
        assert_eq!(beneficiary["family_size"], 1);
    }

    #[test]
    fn test_short_name_is_rejected() {
        let mut payload = doc(json!({"name": "T"}));
        let Err(Rejection::Invalid(details)) = validate("beneficiaries", Mode::Create, &mut payload) else {
            panic!("expected validation failure");
        };
        assert_eq!(details[0], "Ad Soyad en az 2 karakter olmalıdır");
        assert!(details.contains(&"TC Kimlik No 11 haneli olmalıdır".to_string()));
    }

    #[test]
    fn test_update_checks_only_supplied_fields() {
        let mut patch = doc(json!({"city": "Van"}));
        validate("beneficiaries", Mode::Update, &mut patch).unwrap();
        assert!(patch.get("status").is_none());

        let mut patch = doc(json!({"status": "BILINMIYOR"}));
        assert_eq!(
            validate("beneficiaries", Mode::Update, &mut patch),
            Err(Rejection::Invalid(vec!["Geçersiz durum değeri".into()]))
        );
    }

    #[test]
    fn test_donation_required_fields_after_schema() {
        let mut donation = doc(json!({
            "donor_name": "Mehmet Kaya",
            "amount": 250,
            "donor_phone": "(532) 123 45 67",
            "donation_type": "  ",
        }));
        assert_eq!(
            validate("donations", Mode::Create, &mut donation),
            Err(Rejection::MissingFields(vec![
                "Bağış türü".into(),
                "Bağış amacı".into(),
                "Makbuz numarası".into()
            ]))
        );

        let mut donation = doc(json!({"donor_name": "Mehmet Kaya", "amount": -5, "donor_phone": "4321"}));
        let Err(Rejection::Invalid(details)) = validate("donations", Mode::Create, &mut donation) else {
            panic!("expected validation failure");
        };
        assert_eq!(
            details,
            vec![
                "Bağış tutarı pozitif olmalıdır",
                "Geçersiz telefon numarası (5XXXXXXXXX formatında olmalıdır)"
            ]
        );
    }

    #[test]
    fn test_mobile_phone_normalization() {
        assert!(is_mobile_phone("5321234567"));
        assert!(is_mobile_phone("532-123-45-67"));
        assert!(!is_mobile_phone("05321234567"));
    }

    #[test]
    fn test_meeting_enums_and_dates() {
        let mut meeting = doc(json!({"title": "Yönetim", "meeting_date": "2024-05-01", "status": "postponed"}));
        assert_eq!(
            validate("meetings", Mode::Create, &mut meeting),
            Err(Rejection::Invalid(vec!["Geçersiz durum".into()]))
        );

        let mut partner = doc(json!({
            "name": "Kızılay",
            "type": "organization",
            "partnership_type": "donor",
            "collaboration_start_date": "2024-06-01",
            "collaboration_end_date": "2024-01-01",
        }));
        assert_eq!(
            validate("partners", Mode::Create, &mut partner),
            Err(Rejection::Invalid(vec![
                "İşbirliği başlangıç tarihi bitiş tarihinden önce olmalıdır".into()
            ]))
        );
    }

    #[test]
    fn test_update_cannot_null_required_fields() {
        let mut patch = doc(json!({"name": null}));
        assert_eq!(
            validate("beneficiaries", Mode::Update, &mut patch),
            Err(Rejection::Invalid(vec!["Ad Soyad en az 2 karakter olmalıdır".into()]))
        );

        let mut patch = doc(json!({"title": null, "description": null}));
        assert_eq!(
            validate("tasks", Mode::Update, &mut patch),
            Err(Rejection::Invalid(vec!["Görev başlığı en az 3 karakter olmalıdır".into()]))
        );

        // Optional fields may still be cleared.
        let mut patch = doc(json!({"city": null, "email": null}));
        validate("beneficiaries", Mode::Update, &mut patch).unwrap();
    }

    #[test]
    fn test_patterns_compile() {
        assert!(TC_NO.is_match("12345678901"));
        assert!(LOOSE_PHONE.is_match("0532 123 45 67"));
        assert!(MOBILE_PHONE.is_match("5321234567"));
        assert!(EMAIL.is_match("ayse@example.org"));
        assert!(URL.is_match("https://kizilay.org.tr"));
    }
}
