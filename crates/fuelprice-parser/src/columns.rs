use std::fmt;

/// How a source column is typed once it lands in the raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Text,
    Integer,
    Float,
}

/// Every column the fuel price survey export is known to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceColumn {
    PeriodStart,
    PeriodEnd,
    Region,
    State,
    Product,
    StationsSurveyed,
    Unit,
    ResalePriceMean,
    ResalePriceStdDev,
    ResalePriceMin,
    ResalePriceMax,
    ResaleMarginMean,
    ResaleVariationCoef,
    DistributionPriceMean,
    DistributionPriceStdDev,
    DistributionPriceMin,
    DistributionPriceMax,
    DistributionVariationCoef,
}

impl SourceColumn {
    pub const ALL: [SourceColumn; 18] = [
        SourceColumn::PeriodStart,
        SourceColumn::PeriodEnd,
        SourceColumn::Region,
        SourceColumn::State,
        SourceColumn::Product,
        SourceColumn::StationsSurveyed,
        SourceColumn::Unit,
        SourceColumn::ResalePriceMean,
        SourceColumn::ResalePriceStdDev,
        SourceColumn::ResalePriceMin,
        SourceColumn::ResalePriceMax,
        SourceColumn::ResaleMarginMean,
        SourceColumn::ResaleVariationCoef,
        SourceColumn::DistributionPriceMean,
        SourceColumn::DistributionPriceStdDev,
        SourceColumn::DistributionPriceMin,
        SourceColumn::DistributionPriceMax,
        SourceColumn::DistributionVariationCoef,
    ];

    /// Header text as published in the survey export.
    pub fn source_header(&self) -> &'static str {
        match self {
            SourceColumn::PeriodStart => "DATA INICIAL",
            SourceColumn::PeriodEnd => "DATA FINAL",
            SourceColumn::Region => "REGIÃO",
            SourceColumn::State => "ESTADO",
            SourceColumn::Product => "PRODUTO",
            SourceColumn::StationsSurveyed => "NÚMERO DE POSTOS PESQUISADOS",
            SourceColumn::Unit => "UNIDADE DE MEDIDA",
            SourceColumn::ResalePriceMean => "PREÇO MÉDIO REVENDA",
            SourceColumn::ResalePriceStdDev => "DESVIO PADRÃO REVENDA",
            SourceColumn::ResalePriceMin => "PREÇO MÍNIMO REVENDA",
            SourceColumn::ResalePriceMax => "PREÇO MÁXIMO REVENDA",
            SourceColumn::ResaleMarginMean => "MARGEM MÉDIA REVENDA",
            SourceColumn::ResaleVariationCoef => "COEF DE VARIAÇÃO REVENDA",
            SourceColumn::DistributionPriceMean => "PREÇO MÉDIO DISTRIBUIÇÃO",
            SourceColumn::DistributionPriceStdDev => "DESVIO PADRÃO DISTRIBUIÇÃO",
            SourceColumn::DistributionPriceMin => "PREÇO MÍNIMO DISTRIBUIÇÃO",
            SourceColumn::DistributionPriceMax => "PREÇO MÁXIMO DISTRIBUIÇÃO",
            SourceColumn::DistributionVariationCoef => "COEF DE VARIAÇÃO DISTRIBUIÇÃO",
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            SourceColumn::PeriodStart => "period_start",
            SourceColumn::PeriodEnd => "period_end",
            SourceColumn::Region => "region",
            SourceColumn::State => "state",
            SourceColumn::Product => "product",
            SourceColumn::StationsSurveyed => "stations_surveyed",
            SourceColumn::Unit => "unit",
            SourceColumn::ResalePriceMean => "resale_price_mean",
            SourceColumn::ResalePriceStdDev => "resale_price_stddev",
            SourceColumn::ResalePriceMin => "resale_price_min",
            SourceColumn::ResalePriceMax => "resale_price_max",
            SourceColumn::ResaleMarginMean => "resale_margin_mean",
            SourceColumn::ResaleVariationCoef => "resale_variation_coef",
            SourceColumn::DistributionPriceMean => "distribution_price_mean",
            SourceColumn::DistributionPriceStdDev => "distribution_price_stddev",
            SourceColumn::DistributionPriceMin => "distribution_price_min",
            SourceColumn::DistributionPriceMax => "distribution_price_max",
            SourceColumn::DistributionVariationCoef => "distribution_variation_coef",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            SourceColumn::PeriodStart | SourceColumn::PeriodEnd => ColumnKind::Date,
            SourceColumn::Region
            | SourceColumn::State
            | SourceColumn::Product
            | SourceColumn::Unit => ColumnKind::Text,
            SourceColumn::StationsSurveyed => ColumnKind::Integer,
            _ => ColumnKind::Float,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            SourceColumn::PeriodStart
                | SourceColumn::PeriodEnd
                | SourceColumn::State
                | SourceColumn::Product
                | SourceColumn::ResalePriceMean
        )
    }

    /// Maps a raw header onto a known column. Surrounding whitespace is ignored
    /// since some exports ship `" DATA INICIAL"`.
    pub fn classify(header: &str) -> Option<SourceColumn> {
        let trimmed = header.trim().trim_start_matches('\u{feff}').trim();
        Self::ALL
            .iter()
            .copied()
            .find(|column| column.source_header().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for SourceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_tolerates_padded_headers() {
        assert_eq!(
            SourceColumn::classify(" DATA INICIAL"),
            Some(SourceColumn::PeriodStart)
        );
        assert_eq!(
            SourceColumn::classify("DATA FINAL  "),
            Some(SourceColumn::PeriodEnd)
        );
        assert_eq!(SourceColumn::classify("estado"), Some(SourceColumn::State));
        assert_eq!(SourceColumn::classify("Unnamed: 0"), None);
    }

    #[test]
    fn canonical_names_are_unique() {
        let mut names: Vec<&str> = SourceColumn::ALL
            .iter()
            .map(|column| column.canonical_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SourceColumn::ALL.len());
    }
}
