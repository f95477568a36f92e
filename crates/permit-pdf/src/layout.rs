//! Fixed A4 layout of the land-transaction permit application
//!
//! Coordinates are millimetres from the top-left corner of the page.

use std::fmt::Write;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

const FRAME_LEFT_MM: f32 = 15.0;
const FRAME_WIDTH_MM: f32 = 180.0;
const FIELD_HEIGHT_MM: f32 = 5.0;

/// Static text printed on every form
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub text: &'static str,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
}

/// Where a submitted value is printed
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot {
    pub key: &'static str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub size: f32,
}

const fn label(text: &'static str, x: f32, y: f32) -> Label {
    Label {
        text,
        x,
        y,
        size: 9.0,
        bold: false,
    }
}

const fn heading(text: &'static str, x: f32, y: f32) -> Label {
    Label {
        text,
        x,
        y,
        size: 10.0,
        bold: true,
    }
}

const fn slot(key: &'static str, x: f32, y: f32, width: f32) -> FieldSlot {
    FieldSlot {
        key,
        x,
        y,
        width,
        size: 9.0,
    }
}

pub const TITLE: &str = "토지거래계약 허가 신청서";
const TITLE_Y_MM: f32 = 14.0;

/// Section dividers, as y offsets
pub const DIVIDERS: &[f32] = &[28.0, 52.0, 76.0, 86.0, 136.0, 160.0, 176.0, 206.0, 216.0];

pub const LABELS: &[Label] = &[
    heading("매도인", 17.0, 38.0),
    label("성명", 38.0, 31.0),
    label("생년월일", 110.0, 31.0),
    label("주소", 38.0, 38.0),
    label("전화번호", 38.0, 45.0),
    heading("매수인", 17.0, 62.0),
    label("성명", 38.0, 55.0),
    label("생년월일", 110.0, 55.0),
    label("주소", 38.0, 62.0),
    label("전화번호", 38.0, 69.0),
    heading("허가신청하는 권리", 17.0, 79.0),
    heading("토지에 관한 사항", 17.0, 88.0),
    label("소재지", 20.0, 95.0),
    label("지번", 20.0, 102.0),
    label("동", 100.0, 102.0),
    label("호", 140.0, 102.0),
    label("법정지목", 20.0, 109.0),
    label("현실지목", 100.0, 109.0),
    label("면적(㎡)", 20.0, 116.0),
    label("이용현황", 100.0, 116.0),
    label("용도지역·지구", 20.0, 123.0),
    heading("토지에 있는 정착물·권리", 17.0, 138.0),
    label("종류", 20.0, 145.0),
    label("내용", 65.0, 145.0),
    label("권리의 종류", 20.0, 152.0),
    label("권리의 내용", 90.0, 152.0),
    heading("이전 또는 설정에 관한 사항", 17.0, 163.0),
    label("종류", 20.0, 169.0),
    label("내용", 80.0, 169.0),
    heading("계약예정금액", 17.0, 178.0),
    label("지목", 20.0, 185.0),
    label("면적(㎡)", 62.0, 185.0),
    label("단가(원/㎡)", 112.0, 185.0),
    label("토지금액(원)", 20.0, 192.0),
    label("정착물 종류", 95.0, 192.0),
    label("금액", 145.0, 192.0),
    label("예정금액 합계(원)", 20.0, 199.0),
    heading("토지의 이용목적", 17.0, 209.0),
    label(
        "「부동산 거래신고 등에 관한 법률」 제11조제1항에 따라 위와 같이 토지거래계약 허가를 신청합니다.",
        17.0,
        224.0,
    ),
    label("년", 145.0, 236.0),
    label("월", 161.0, 236.0),
    label("일", 177.0, 236.0),
    label("신청인", 110.0, 246.0),
    label("(서명 또는 인)", 170.0, 246.0),
    Label {
        text: "귀하",
        x: 72.0,
        y: 262.0,
        size: 12.0,
        bold: false,
    },
];

pub const FIELDS: &[FieldSlot] = &[
    slot("seller_name", 50.0, 31.0, 55.0),
    slot("seller_birth", 128.0, 31.0, 40.0),
    slot("seller_address", 50.0, 38.0, 140.0),
    slot("seller_phone", 55.0, 45.0, 50.0),
    slot("buyer_name", 50.0, 55.0, 55.0),
    slot("buyer_birth", 128.0, 55.0, 40.0),
    slot("buyer_address", 50.0, 62.0, 140.0),
    slot("buyer_phone", 55.0, 69.0, 50.0),
    slot("right_type", 60.0, 79.0, 130.0),
    slot("land1_address", 38.0, 95.0, 155.0),
    slot("land1_jibun", 38.0, 102.0, 40.0),
    slot("land1_dong", 108.0, 102.0, 25.0),
    slot("land1_ho", 148.0, 102.0, 25.0),
    slot("land1_jimok_legal", 38.0, 109.0, 40.0),
    slot("land1_jimok_actual", 118.0, 109.0, 40.0),
    slot("land1_area", 38.0, 116.0, 40.0),
    slot("land1_use_status", 118.0, 116.0, 75.0),
    slot("land1_usage", 45.0, 123.0, 148.0),
    slot("fixture1_type", 32.0, 145.0, 30.0),
    slot("fixture1_content", 77.0, 145.0, 115.0),
    slot("fixture1_right_type", 42.0, 152.0, 45.0),
    slot("fixture1_right_content", 112.0, 152.0, 80.0),
    slot("transfer1_type", 32.0, 169.0, 45.0),
    slot("transfer1_content", 92.0, 169.0, 100.0),
    slot("price1_jimok", 32.0, 185.0, 28.0),
    slot("price1_area", 78.0, 185.0, 32.0),
    slot("price1_unit", 132.0, 185.0, 60.0),
    slot("price1_land_total", 42.0, 192.0, 50.0),
    slot("price1_fixture_type", 115.0, 192.0, 28.0),
    slot("price1_fixture_amount", 155.0, 192.0, 38.0),
    slot("price1_total", 50.0, 199.0, 80.0),
    slot("use_purpose", 50.0, 209.0, 143.0),
    slot("app_year", 130.0, 236.0, 14.0),
    slot("app_month", 152.0, 236.0, 8.0),
    slot("app_day", 168.0, 236.0, 8.0),
    slot("applicant_name", 125.0, 246.0, 44.0),
    FieldSlot {
        key: "authority",
        x: 20.0,
        y: 262.0,
        width: 50.0,
        size: 12.0,
    },
];

/// Quote `text` as a Typst string literal.
pub fn string_literal(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Typst source for the form, with `families` tried in order for every glyph.
///
/// Field values are read from `sys.inputs` at compile time.
pub fn form_source(families: &[String]) -> String {
    let mut source = String::new();
    let font_list: String = families
        .iter()
        .map(|family| format!("{}, ", string_literal(family)))
        .collect();

    // Writing into a String cannot fail
    let _ = writeln!(source, "#set page(paper: \"a4\", margin: 0mm)");
    let _ = writeln!(source, "#set text(font: ({}), size: 9pt, lang: \"ko\")", font_list);
    let _ = writeln!(source, "#let entry(key) = sys.inputs.at(key, default: \"\")");

    let _ = writeln!(
        source,
        "#place(top + center, dy: {}mm, text(size: 16pt, weight: \"bold\", {}))",
        TITLE_Y_MM,
        string_literal(TITLE)
    );

    let frame_top = DIVIDERS.first().copied().unwrap_or_default();
    let frame_bottom = DIVIDERS.last().copied().unwrap_or_default();
    let _ = writeln!(
        source,
        "#place(top + left, dx: {}mm, dy: {}mm, rect(width: {}mm, height: {}mm, stroke: 0.6pt))",
        FRAME_LEFT_MM,
        frame_top,
        FRAME_WIDTH_MM,
        frame_bottom - frame_top
    );
    for y in DIVIDERS {
        let _ = writeln!(
            source,
            "#place(top + left, dx: {}mm, dy: {}mm, line(length: {}mm, stroke: 0.4pt))",
            FRAME_LEFT_MM, y, FRAME_WIDTH_MM
        );
    }

    for label in LABELS {
        let weight = if label.bold { "bold" } else { "regular" };
        let _ = writeln!(
            source,
            "#place(top + left, dx: {}mm, dy: {}mm, text(size: {}pt, weight: \"{}\", {}))",
            label.x,
            label.y,
            label.size,
            weight,
            string_literal(label.text)
        );
    }

    for field in FIELDS {
        let _ = writeln!(
            source,
            "#place(top + left, dx: {}mm, dy: {}mm, box(width: {}mm, height: {}mm, clip: true, text(size: {}pt, entry({}))))",
            field.x,
            field.y,
            field.width,
            FIELD_HEIGHT_MM,
            field.size,
            string_literal(field.key)
        );
    }

    source
}
