//! Featured vehicle catalog.
//!
//! The landing page renders a curated selection of vehicle cards. The
//! selection is editorial content that ships with the storefront; rendering
//! is the embedding UI's job, only the data model lives here.

use serde::{Deserialize, Serialize};

/// One vehicle card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Display title, e.g. `"Caminhão Volvo FH 540 6x4"`.
    pub title: String,
    /// Sales copy shown on the card.
    pub description: String,
    /// Asset path of the card image.
    pub image: String,
    /// Model year.
    pub year: u16,
    /// Odometer reading in kilometers.
    pub mileage_km: u32,
    /// Brazilian state code where the vehicle is located.
    pub location: String,
    /// Highlighted card on the landing page.
    #[serde(default)]
    pub featured: bool,
}

impl Vehicle {
    /// Odometer reading formatted for display, e.g. `"200.000 km"`.
    #[must_use]
    pub fn mileage_display(&self) -> String {
        format_mileage(self.mileage_km)
    }
}

/// The curated featured selection shown on the landing page.
#[must_use]
pub fn featured_vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            title: "Ônibus Mascarello Gran Midi Urbano".to_owned(),
            description: "Ônibus urbano único dono, com acessibilidade, mecânica Volvo MWM, 47 lugares, \
                          revisado e pronto para uso imediato."
                .to_owned(),
            image: "assets/bus-1.jpg".to_owned(),
            year: 2019,
            mileage_km: 200_000,
            location: "SP".to_owned(),
            featured: true,
        },
        Vehicle {
            title: "Caminhão Mercedes-Benz Atego 2430".to_owned(),
            description: "Caminhão truck em excelente estado de conservação, motor Mercedes OM 926, cabine \
                          leito, ideal para longas distâncias."
                .to_owned(),
            image: "assets/truck-1.jpg".to_owned(),
            year: 2020,
            mileage_km: 180_000,
            location: "RJ".to_owned(),
            featured: false,
        },
        Vehicle {
            title: "Ônibus Rodoviário Marcopolo Paradiso".to_owned(),
            description: "Ônibus rodoviário de luxo, ar condicionado, banheiro, poltrona reclinável, \
                          perfeito para viagens intermunicipais."
                .to_owned(),
            image: "assets/bus-2.jpg".to_owned(),
            year: 2018,
            mileage_km: 250_000,
            location: "MG".to_owned(),
            featured: false,
        },
        Vehicle {
            title: "Caminhão Volvo FH 540 6x4".to_owned(),
            description: "Cavalo mecânico premium, motor I-Shift automatizado, freio motor VEB, ideal para \
                          operações de alto desempenho."
                .to_owned(),
            image: "assets/truck-2.jpg".to_owned(),
            year: 2021,
            mileage_km: 150_000,
            location: "PR".to_owned(),
            featured: false,
        },
    ]
}

/// Format a kilometer reading with pt-BR thousands grouping.
#[must_use]
pub fn format_mileage(km: u32) -> String {
    let digits = km.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{grouped} km")
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
