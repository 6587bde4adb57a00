//! Информация о тактировании

use embassy_rp::clocks;

use crate::config::hardware::system::MIN_SYS_FREQ_HZ;

/// Вывести частоты в лог
pub fn print_clock_info() {
    defmt::info!("Системная частота: {} МГц", clocks::clk_sys_freq() / 1_000_000);
    defmt::info!("Периферийная частота: {} МГц", clocks::clk_peri_freq() / 1_000_000);
}

/// Проверка частоты ядра: ниже предела таймеры шагов теряют точность
pub fn validate_clocks() -> Result<(), &'static str> {
    if clocks::clk_sys_freq() < MIN_SYS_FREQ_HZ {
        return Err("Системная частота слишком низкая");
    }
    Ok(())
}
