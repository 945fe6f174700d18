//! RT5645 hardware driver
//!
//! Communicates with the chip via I²C using the `embedded_hal_async::i2c::I2c`
//! trait, so it is HAL-agnostic while remaining async. Registers are 16 bits
//! wide and always written back in full after a read-modify-write; nothing
//! is cached, so repeating a call reprograms the same values.

use embedded_hal_async::i2c::I2c;
use platform::board_config::RT5645_I2C_ADDR;
use platform::{
    AsrcClockSource, AsrcFilters, ClockDirection, Codec, JackEvent, JackSink, JackType, PllId,
    PllSource, SysclkSource,
};
use thiserror_no_std::Error;

use super::pll::{self, PllCoefficients, PllError};
use super::registers::*;

/// RT5645 driver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rt5645Error<E: core::fmt::Debug> {
    /// Bus transfer failed.
    #[error("i2c transfer failed")]
    I2c(E),
    /// No valid divider set for the requested PLL frequencies.
    #[error("pll: {0}")]
    Pll(PllError),
}

impl<E: core::fmt::Debug> From<PllError> for Rt5645Error<E> {
    fn from(e: PllError) -> Self {
        Self::Pll(e)
    }
}

/// RT5645 codec driver
pub struct Rt5645<I> {
    i2c: I,
    address: u8,
    sysclk_hz: u32,
    sysclk_source: Option<SysclkSource>,
    pll: Option<PllCoefficients>,
    jack: Option<&'static dyn JackSink>,
}

impl<I: I2c> Rt5645<I> {
    /// Create a driver at the bonnet's address (`0x1A`).
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, RT5645_I2C_ADDR)
    }

    /// Create a driver at a non-default address.
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            sysclk_hz: 0,
            sysclk_source: None,
            pll: None,
            jack: None,
        }
    }

    /// Sysclk frequency last programmed (Hz), zero before the first call.
    pub fn sysclk_hz(&self) -> u32 {
        self.sysclk_hz
    }

    /// Sysclk source last programmed.
    pub fn sysclk_source(&self) -> Option<SysclkSource> {
        self.sysclk_source
    }

    /// PLL divider codes last programmed.
    pub fn pll(&self) -> Option<PllCoefficients> {
        self.pll
    }

    /// Release the bus.
    pub fn release(self) -> I {
        self.i2c
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u16, Rt5645Error<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .await
            .map_err(Rt5645Error::I2c)?;
        Ok(u16::from_be_bytes(buf))
    }

    async fn write_reg(&mut self, reg: u8, value: u16) -> Result<(), Rt5645Error<I::Error>> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[reg, hi, lo])
            .await
            .map_err(Rt5645Error::I2c)
    }

    /// Software reset: any write to REG_RESET restores register defaults.
    ///
    /// Forgets the recorded sysclk and PLL settings; a wired jack stays wired
    /// on the host side but the codec IRQ must be re-enabled.
    pub async fn reset(&mut self) -> Result<(), Rt5645Error<I::Error>> {
        self.write_reg(REG_RESET, 0).await?;
        self.sysclk_hz = 0;
        self.sysclk_source = None;
        self.pll = None;
        Ok(())
    }

    /// Replace the bits under `mask` with `value`.
    async fn update_bits(&mut self, reg: u8, mask: u16, value: u16) -> Result<(), Rt5645Error<I::Error>> {
        let old = self.read_reg(reg).await?;
        self.write_reg(reg, (old & !mask) | (value & mask)).await
    }

    /// Read the jack-detect level and report it to the wired jack.
    ///
    /// Returns `true` if a plug is present.
    pub async fn report_jack(&mut self) -> Result<bool, Rt5645Error<I::Error>> {
        let inserted = self.jack_inserted().await?;
        self.publish_jack(inserted);
        Ok(inserted)
    }

    /// JD1 reads low while a plug is present.
    async fn jack_inserted(&mut self) -> Result<bool, Rt5645Error<I::Error>> {
        Ok((self.read_reg(REG_INT_IRQ_ST).await? & INT_IRQ_ST_JD1) == 0)
    }

    fn publish_jack(&self, inserted: bool) {
        if let Some(jack) = self.jack {
            jack.report(JackEvent {
                status: if inserted {
                    JackType::HEADPHONE
                } else {
                    JackType::empty()
                },
                mask: JackType::HEADPHONE,
            });
        }
    }

    /// Route JD1 to the GPIO1 IRQ output and sample the current level.
    async fn enable_jack_irq(&mut self, gpio: u16, irq: u16) -> Result<bool, Rt5645Error<I::Error>> {
        self.write_reg(REG_GPIO_CTRL1, gpio | GPIO1_IS_IRQ).await?;
        self.write_reg(REG_IRQ_CTRL2, irq | IRQ_JD1_EN).await?;
        self.jack_inserted().await
    }

    /// Put both IRQ registers back to the values read before enabling.
    async fn restore_jack_irq(&mut self, gpio: u16, irq: u16) {
        if let Err(e) = self.write_reg(REG_IRQ_CTRL2, irq).await {
            tracing::warn!("rt5645: can't restore IRQ_CTRL2: {:?}", e);
        }
        if let Err(e) = self.write_reg(REG_GPIO_CTRL1, gpio).await {
            tracing::warn!("rt5645: can't restore GPIO_CTRL1: {:?}", e);
        }
    }
}

/// Clock-select fields a filter set touches: (register, shift).
fn asrc_fields(filters: AsrcFilters) -> impl Iterator<Item = (u8, u16)> {
    [
        (AsrcFilters::DA_STEREO, REG_ASRC_2, ASRC_DA_STO_SHIFT),
        (AsrcFilters::DA_MONO_L, REG_ASRC_2, ASRC_DA_MONO_L_SHIFT),
        (AsrcFilters::DA_MONO_R, REG_ASRC_2, ASRC_DA_MONO_R_SHIFT),
        (AsrcFilters::AD_STEREO, REG_ASRC_2, ASRC_AD_STO_SHIFT),
        (AsrcFilters::AD_MONO_L, REG_ASRC_3, ASRC_AD_MONO_L_SHIFT),
        (AsrcFilters::AD_MONO_R, REG_ASRC_3, ASRC_AD_MONO_R_SHIFT),
    ]
    .into_iter()
    .filter(move |(filter, _, _)| filters.contains(*filter))
    .map(|(_, reg, shift)| (reg, shift))
}

/// Accumulate `(mask, value)` for one ASRC register.
#[allow(clippy::arithmetic_side_effects)] // shifts are register constants < 16
fn asrc_update(filters: AsrcFilters, reg: u8, clk: u16) -> (u16, u16) {
    asrc_fields(filters)
        .filter(|(r, _)| *r == reg)
        .fold((0, 0), |(mask, value), (_, shift)| {
            (mask | (ASRC_SEL_MASK << shift), value | (clk << shift))
        })
}

impl<I: I2c> Codec for Rt5645<I> {
    type Error = Rt5645Error<I::Error>;

    async fn select_asrc_clock(
        &mut self,
        filters: AsrcFilters,
        source: AsrcClockSource,
    ) -> Result<(), Self::Error> {
        let clk = match source {
            AsrcClockSource::Sysclk => ASRC_CLK_SYSCLK,
            AsrcClockSource::I2s1Asrc => ASRC_CLK_I2S1_ASRC,
            AsrcClockSource::I2s2Asrc => ASRC_CLK_I2S2_ASRC,
        };
        for reg in [REG_ASRC_2, REG_ASRC_3] {
            let (mask, value) = asrc_update(filters, reg, clk);
            if mask != 0 {
                self.update_bits(reg, mask, value).await?;
            }
        }
        Ok(())
    }

    async fn set_sysclk(
        &mut self,
        source: SysclkSource,
        freq_hz: u32,
        direction: ClockDirection,
    ) -> Result<(), Self::Error> {
        let bits = match source {
            SysclkSource::Mclk => GLB_CLK_SCLK_SRC_MCLK,
            SysclkSource::Pll1 => GLB_CLK_SCLK_SRC_PLL1,
            SysclkSource::RcClock => GLB_CLK_SCLK_SRC_RCCLK,
        };
        // The chip has one sysclk mux; both directions program it.
        self.update_bits(REG_GLB_CLK, GLB_CLK_SCLK_SRC_MASK, bits)
            .await?;
        self.sysclk_hz = freq_hz;
        self.sysclk_source = Some(source);
        tracing::debug!(
            "rt5645 sysclk {:?} {} Hz ({:?})",
            source,
            freq_hz,
            direction
        );
        Ok(())
    }

    async fn set_pll(
        &mut self,
        pll: PllId,
        source: PllSource,
        freq_in_hz: u32,
        freq_out_hz: u32,
    ) -> Result<(), Self::Error> {
        let PllId::Pll1 = pll;
        let coeffs = pll::search(freq_in_hz, freq_out_hz).map_err(|e| {
            tracing::error!("rt5645 pll: {}", e);
            Rt5645Error::Pll(e)
        })?;
        let src = match source {
            PllSource::Mclk => GLB_CLK_PLL1_SRC_MCLK,
            PllSource::Bclk1 => GLB_CLK_PLL1_SRC_BCLK1,
            PllSource::Bclk2 => GLB_CLK_PLL1_SRC_BCLK2,
        };
        self.update_bits(REG_GLB_CLK, GLB_CLK_PLL1_SRC_MASK, src)
            .await?;
        self.write_reg(REG_PLL_CTRL1, coeffs.ctrl1()).await?;
        self.write_reg(REG_PLL_CTRL2, coeffs.ctrl2()).await?;
        self.pll = Some(coeffs);
        tracing::debug!(
            "rt5645 pll {} -> {} Hz: n={} k={} m={:?}",
            freq_in_hz,
            freq_out_hz,
            coeffs.n,
            coeffs.k,
            coeffs.m
        );
        Ok(())
    }

    /// Enable JD1 detection and report the initial level.
    ///
    /// The jack is only kept once every register access succeeded; on any
    /// failure the IRQ registers are written back to what they held before.
    async fn set_jack_detect(&mut self, jack: &'static dyn JackSink) -> Result<(), Self::Error> {
        let gpio = self.read_reg(REG_GPIO_CTRL1).await?;
        let irq = self.read_reg(REG_IRQ_CTRL2).await?;
        let inserted = match self.enable_jack_irq(gpio, irq).await {
            Ok(inserted) => inserted,
            Err(e) => {
                tracing::error!("rt5645 jack detect: {:?}", e);
                self.restore_jack_irq(gpio, irq).await;
                return Err(e);
            }
        };
        self.jack = Some(jack);
        self.publish_jack(inserted);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use platform::Jack;

    const ADDR: u8 = 0x1A;

    fn read(reg: u8, value: u16) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![reg], value.to_be_bytes().to_vec())
    }

    fn write(reg: u8, value: u16) -> I2cTransaction {
        let [hi, lo] = value.to_be_bytes();
        I2cTransaction::write(ADDR, vec![reg, hi, lo])
    }

    #[tokio::test]
    async fn sysclk_pll_sets_only_source_field() {
        let i2c = I2cMock::new(&[read(REG_GLB_CLK, 0x0800), write(REG_GLB_CLK, 0x4800)]);
        let mut codec = Rt5645::new(i2c);
        codec
            .set_sysclk(SysclkSource::Pll1, 24_576_000, ClockDirection::In)
            .await
            .unwrap();
        assert_eq!(codec.sysclk_hz(), 24_576_000);
        assert_eq!(codec.sysclk_source(), Some(SysclkSource::Pll1));
        codec.release().done();
    }

    #[tokio::test]
    async fn pll_96k_programs_bypass_dividers() {
        let i2c = I2cMock::new(&[
            read(REG_GLB_CLK, 0x4000),
            write(REG_GLB_CLK, 0x4000),
            write(REG_PLL_CTRL1, 2 << 7),
            write(REG_PLL_CTRL2, PLL_M_BYPASS),
        ]);
        let mut codec = Rt5645::new(i2c);
        codec
            .set_pll(PllId::Pll1, PllSource::Mclk, 24_576_000, 49_152_000)
            .await
            .unwrap();
        assert_eq!(codec.pll(), Some(PllCoefficients { n: 2, k: 0, m: None }));
        codec.release().done();
    }

    #[tokio::test]
    async fn unreachable_pll_touches_no_register() {
        let mut codec = Rt5645::new(I2cMock::new(&[]));
        let err = codec
            .set_pll(PllId::Pll1, PllSource::Mclk, 100_000, 49_152_000)
            .await
            .unwrap_err();
        assert_eq!(err, Rt5645Error::Pll(PllError::InputOutOfRange(100_000)));
        assert_eq!(codec.pll(), None);
        codec.release().done();
    }

    #[tokio::test]
    async fn asrc_selection_for_card_filters() {
        let filters = AsrcFilters::DA_STEREO
            | AsrcFilters::AD_STEREO
            | AsrcFilters::DA_MONO_L
            | AsrcFilters::DA_MONO_R;
        // Only ASRC_2 holds these four fields.
        let i2c = I2cMock::new(&[read(REG_ASRC_2, 0x0000), write(REG_ASRC_2, 0x1111)]);
        let mut codec = Rt5645::new(i2c);
        codec
            .select_asrc_clock(filters, AsrcClockSource::I2s1Asrc)
            .await
            .unwrap();
        codec.release().done();
    }

    #[tokio::test]
    async fn asrc_selection_for_mono_adc_uses_asrc_3() {
        let i2c = I2cMock::new(&[read(REG_ASRC_3, 0x00FF), write(REG_ASRC_3, 0x22FF)]);
        let mut codec = Rt5645::new(i2c);
        codec
            .select_asrc_clock(
                AsrcFilters::AD_MONO_L | AsrcFilters::AD_MONO_R,
                AsrcClockSource::I2s2Asrc,
            )
            .await
            .unwrap();
        codec.release().done();
    }

    fn headphone_jack() -> &'static Jack {
        Box::leak(Box::new(Jack::new(
            "Headphone Jack",
            JackType::HEADPHONE,
            platform::JackPin {
                pin: "Headphone",
                mask: JackType::HEADPHONE,
                invert: false,
            },
        )))
    }

    #[tokio::test]
    async fn jack_detect_enables_irq_and_reports_initial_state() {
        let jack = headphone_jack();
        let i2c = I2cMock::new(&[
            read(REG_GPIO_CTRL1, 0x0002),
            read(REG_IRQ_CTRL2, 0x0000),
            write(REG_GPIO_CTRL1, 0x0002 | GPIO1_IS_IRQ),
            write(REG_IRQ_CTRL2, IRQ_JD1_EN),
            // JD1 low: plug present.
            read(REG_INT_IRQ_ST, 0x0000),
        ]);
        let mut codec = Rt5645::new(i2c);
        codec.set_jack_detect(jack).await.unwrap();
        assert!(codec.jack.is_some());
        assert_eq!(jack.status(), JackType::HEADPHONE);
        assert!(jack.pin_enabled());
        codec.release().done();
    }

    #[tokio::test]
    async fn failed_status_read_unwires_jack_detect() {
        use embedded_hal::i2c::ErrorKind;
        let jack = headphone_jack();
        let i2c = I2cMock::new(&[
            read(REG_GPIO_CTRL1, 0x0002),
            read(REG_IRQ_CTRL2, 0x0000),
            write(REG_GPIO_CTRL1, 0x0002 | GPIO1_IS_IRQ),
            write(REG_IRQ_CTRL2, IRQ_JD1_EN),
            read(REG_INT_IRQ_ST, 0x0000).with_error(ErrorKind::Other),
            // Both IRQ registers go back to what they held.
            write(REG_IRQ_CTRL2, 0x0000),
            write(REG_GPIO_CTRL1, 0x0002),
        ]);
        let mut codec = Rt5645::new(i2c);
        let err = codec.set_jack_detect(jack).await.unwrap_err();
        assert_eq!(err, Rt5645Error::I2c(ErrorKind::Other));
        assert!(codec.jack.is_none());
        assert!(jack.status().is_empty());
        codec.release().done();
    }

    #[tokio::test]
    async fn failed_jd1_enable_restores_gpio1() {
        use embedded_hal::i2c::ErrorKind;
        let jack = headphone_jack();
        let i2c = I2cMock::new(&[
            read(REG_GPIO_CTRL1, 0x0000),
            read(REG_IRQ_CTRL2, 0x0100),
            write(REG_GPIO_CTRL1, GPIO1_IS_IRQ),
            write(REG_IRQ_CTRL2, 0x0100 | IRQ_JD1_EN).with_error(ErrorKind::Other),
            write(REG_IRQ_CTRL2, 0x0100),
            write(REG_GPIO_CTRL1, 0x0000),
        ]);
        let mut codec = Rt5645::new(i2c);
        assert!(codec.set_jack_detect(jack).await.is_err());
        assert!(codec.jack.is_none());
        codec.release().done();
    }

    #[tokio::test]
    async fn failed_register_read_writes_nothing() {
        use embedded_hal::i2c::ErrorKind;
        let i2c = I2cMock::new(&[read(REG_GPIO_CTRL1, 0).with_error(ErrorKind::Other)]);
        let mut codec = Rt5645::new(i2c);
        assert!(codec.set_jack_detect(headphone_jack()).await.is_err());
        assert!(codec.jack.is_none());
        codec.release().done();
    }

    #[tokio::test]
    async fn reset_forgets_clock_settings() {
        let i2c = I2cMock::new(&[
            read(REG_GLB_CLK, 0x0000),
            write(REG_GLB_CLK, 0x0000),
            write(REG_RESET, 0x0000),
        ]);
        let mut codec = Rt5645::new(i2c);
        codec
            .set_sysclk(SysclkSource::Mclk, 24_576_000, ClockDirection::In)
            .await
            .unwrap();
        codec.reset().await.unwrap();
        assert_eq!(codec.sysclk_source(), None);
        assert_eq!(codec.sysclk_hz(), 0);
        codec.release().done();
    }

    #[tokio::test]
    async fn bus_error_is_propagated() {
        use embedded_hal::i2c::ErrorKind;
        let i2c = I2cMock::new(&[read(REG_GLB_CLK, 0).with_error(ErrorKind::Other)]);
        let mut codec = Rt5645::new(i2c);
        let err = codec
            .set_sysclk(SysclkSource::Mclk, 24_576_000, ClockDirection::In)
            .await
            .unwrap_err();
        assert_eq!(err, Rt5645Error::I2c(ErrorKind::Other));
        assert_eq!(codec.sysclk_source(), None);
        codec.release().done();
    }
}
