mod qr;

pub use qr::{LayoutConfig, QR};

use tracing::debug;

use crate::common::{
    bitstream::BitStream,
    codec::encode,
    ec::{ParityCodec, ReedSolomon},
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{format_info, ECLevel, Version},
};

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
    logo_clearance: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: ECLevel::L, mask: None, logo_clearance: false }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    /// Pins the version. Only the ec level is relaxed when the data doesn't fit.
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    /// Strongest level to try, L unless set. Weaker levels are tried when
    /// capacity runs out.
    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    /// Keeps a centred 5x5 box free of data for an overlaid logo. Only honoured
    /// for version 2. The box leaves 334 data modules, fewer than the 352 bits
    /// of a version 2 payload, so `build` fails with
    /// [`QRError::EncodingRegionTooSmall`] rather than drop codewords.
    pub fn logo_clearance(&mut self, enabled: bool) -> &mut Self {
        self.logo_clearance = enabled;
        self
    }

    pub fn metadata(&self) -> String {
        match self.version {
            Some(v) => format!(
                "{{ Version: {:?}, Ec level: {:?}, Logo clearance: {} }}",
                *v, self.ec_level, self.logo_clearance
            ),
            None => format!(
                "{{ Version: None, Ec level: {:?}, Logo clearance: {} }}",
                self.ec_level, self.logo_clearance
            ),
        }
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        self.build_with(&ReedSolomon)
    }

    pub fn build_with(&self, codec: &impl ParityCodec) -> QRResult<QR> {
        debug!(data_len = self.data.len(), "Generating QR {}", self.metadata());

        debug!("Encoding data...");
        let (encoded_data, version, ec_level) = encode(self.data, self.ec_level, self.version)?;
        debug!(version = *version, ?ec_level, "Selected version and ec level");

        let layout = LayoutConfig::new(version, self.logo_clearance);
        let required = version.total_codewords() << 3;
        let available = layout.data_module_count();
        if required > available {
            return Err(QRError::EncodingRegionTooSmall { required, available });
        }

        debug!("Constructing payload with ecc...");
        let payload = Self::construct_payload(&encoded_data, version, ec_level, codec);

        debug!("Constructing QR...");
        let mut qr = QR::new(layout, ec_level);

        debug!("Drawing functional patterns...");
        qr.draw_all_function_patterns();

        debug!("Drawing encoding region...");
        qr.draw_encoding_region(&payload);

        let (mask, mut qr) = match self.mask {
            Some(m) => {
                debug!(mask = *m, "Applying mask...");
                qr.apply_mask(m);
                (m, qr)
            }
            None => {
                debug!("Finding & applying best mask...");
                apply_best_mask(&qr)
            }
        };

        debug!(mask = *mask, "Drawing format info...");
        qr.draw_format_info(format_info(ec_level, mask));

        let total_modules = qr.width() * qr.width();
        let dark_modules = qr.count_dark_modules();
        debug!(
            dark_modules,
            light_modules = total_modules - dark_modules,
            balance = dark_modules * 100 / total_modules,
            "QR generated"
        );

        Ok(qr)
    }

    // Data codewords followed by parity codewords, as one block
    fn construct_payload(
        encoded_data: &BitStream,
        version: Version,
        ec_level: ECLevel,
        codec: &impl ParityCodec,
    ) -> BitStream {
        let ecc_count = version.ecc_codewords(ec_level);
        let ecc = codec.parity(encoded_data.data(), ecc_count);
        assert_eq!(
            ecc.len(),
            ecc_count,
            "Parity codec returned {} codewords, expected {ecc_count}",
            ecc.len()
        );

        let mut payload = BitStream::new(version.total_codewords() << 3);
        payload.extend(encoded_data.data());
        payload.extend(&ecc);
        payload
    }
}
